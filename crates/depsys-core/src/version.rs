//! Maven-style version strings: parsing, ordering and range expressions.
//!
//! Ordering rules:
//! - Items are split on `.` and `-`
//! - Numeric items compare as numbers, and a missing item counts as `0`
//! - Known qualifiers order as
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < release < `sp`
//! - Unknown words sort below a release and compare case-insensitively

use std::cmp::Ordering;
use std::fmt;

use crate::comparator::VersionComparator;

/// A parsed version string with comparable items.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    text: String,
    items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Number(u64),
    Qualifier(Qualifier),
    Word(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Qualifier {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl Item {
    fn from_token(token: &str) -> Self {
        if let Ok(n) = token.parse::<u64>() {
            return Item::Number(n);
        }
        let qualifier = match token.to_ascii_lowercase().as_str() {
            "alpha" | "a" => Qualifier::Alpha,
            "beta" | "b" => Qualifier::Beta,
            "milestone" | "m" => Qualifier::Milestone,
            "rc" | "cr" => Qualifier::Rc,
            "snapshot" => Qualifier::Snapshot,
            "ga" | "final" | "release" => Qualifier::Release,
            "sp" => Qualifier::Sp,
            _ => return Item::Word(token.to_ascii_lowercase()),
        };
        Item::Qualifier(qualifier)
    }

    /// Ordering of this item against a missing item at the same position.
    fn cmp_to_missing(&self) -> Ordering {
        match self {
            Item::Number(n) => n.cmp(&0),
            Item::Qualifier(q) => q.cmp(&Qualifier::Release),
            Item::Word(_) => Ordering::Less,
        }
    }

    fn cmp_item(&self, other: &Item) -> Ordering {
        match (self, other) {
            (Item::Number(a), Item::Number(b)) => a.cmp(b),
            (Item::Qualifier(a), Item::Qualifier(b)) => a.cmp(b),
            (Item::Word(a), Item::Word(b)) => a.cmp(b),
            (Item::Number(_), _) => Ordering::Greater,
            (_, Item::Number(_)) => Ordering::Less,
            (Item::Qualifier(q), Item::Word(_)) => {
                if *q >= Qualifier::Release {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Item::Word(_), Item::Qualifier(_)) => other.cmp_item(self).reverse(),
        }
    }
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let items = version
            .split(['.', '-'])
            .filter(|token| !token.is_empty())
            .map(Item::from_token)
            .collect();
        Self {
            text: version.to_string(),
            items,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Leading numeric item, or `0` when the version does not start with one.
    pub fn major(&self) -> u64 {
        self.numeric_at(0)
    }

    /// Second numeric item, or `0` when absent.
    pub fn minor(&self) -> u64 {
        self.numeric_at(1)
    }

    fn numeric_at(&self, index: usize) -> u64 {
        match self.items.get(index) {
            Some(Item::Number(n)) => *n,
            _ => 0,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.items
            .iter()
            .any(|item| *item == Item::Qualifier(Qualifier::Snapshot))
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        (0..len)
            .map(|i| match (self.items.get(i), other.items.get(i)) {
                (Some(a), Some(b)) => a.cmp_item(b),
                (Some(a), None) => a.cmp_to_missing(),
                (None, Some(b)) => b.cmp_to_missing().reverse(),
                (None, None) => Ordering::Equal,
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One end of a [`VersionRange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: String,
    pub inclusive: bool,
}

/// A Maven range expression: `[1.0,2.0)`, `[1.0,]`, `(,2.0]`, `[1.5]`.
///
/// Bounds are kept as strings and compared with whatever
/// [`VersionComparator`] the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl VersionRange {
    /// Parse a range expression. Returns `None` for bare versions and for
    /// expressions without matching brackets.
    pub fn parse(spec: &str) -> Option<Self> {
        let s = spec.trim();
        let lower_inclusive = match s.chars().next()? {
            '[' => true,
            '(' => false,
            _ => return None,
        };
        let upper_inclusive = match s.chars().last()? {
            ']' => true,
            ')' => false,
            _ => return None,
        };
        if s.len() < 2 {
            return None;
        }
        let inner = &s[1..s.len() - 1];

        let bound = |text: &str, inclusive: bool| {
            let text = text.trim();
            (!text.is_empty()).then(|| Bound {
                version: text.to_string(),
                inclusive,
            })
        };

        match inner.split_once(',') {
            Some((lower, upper)) => Some(VersionRange {
                lower: bound(lower, lower_inclusive),
                upper: bound(upper, upper_inclusive),
            }),
            None => {
                let exact = bound(inner, true)?;
                Some(VersionRange {
                    lower: Some(exact.clone()),
                    upper: Some(exact),
                })
            }
        }
    }

    pub fn contains(&self, version: &str, cmp: &dyn VersionComparator) -> bool {
        let above_lower = self.lower.as_ref().map_or(true, |b| {
            match cmp.compare(version, &b.version) {
                Ordering::Greater => true,
                Ordering::Equal => b.inclusive,
                Ordering::Less => false,
            }
        });
        let below_upper = self.upper.as_ref().map_or(true, |b| {
            match cmp.compare(version, &b.version) {
                Ordering::Less => true,
                Ordering::Equal => b.inclusive,
                Ordering::Greater => false,
            }
        });
        above_lower && below_upper
    }
}
