//! Predicates deciding whether an available version satisfies a requirement.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::comparator::VersionComparator;
use crate::version::{MavenVersion, VersionRange};

/// Does `available` satisfy the dependency requirement `required`?
///
/// Rules are pure: the answer depends only on the two strings and the
/// system comparator.
pub trait MatchRule: fmt::Debug + Send + Sync {
    /// Name used in universe files and diagnostics.
    fn name(&self) -> &str;

    fn is_satisfied(&self, required: &str, available: &str, cmp: &dyn VersionComparator) -> bool;
}

/// Shared handle to a rule, as stored in a [`crate::dependency::Dependency`].
pub type SharedRule = Arc<dyn MatchRule>;

/// Any available version satisfies.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyVersion;

impl MatchRule for AnyVersion {
    fn name(&self) -> &str {
        "any"
    }

    fn is_satisfied(&self, _: &str, _: &str, _: &dyn VersionComparator) -> bool {
        true
    }
}

/// The available version must equal the requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Perfect;

impl MatchRule for Perfect {
    fn name(&self) -> &str {
        "perfect"
    }

    fn is_satisfied(&self, required: &str, available: &str, cmp: &dyn VersionComparator) -> bool {
        cmp.compare(available, required) == Ordering::Equal
    }
}

/// Same major and minor as the requirement, and not older.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equivalent;

impl MatchRule for Equivalent {
    fn name(&self) -> &str {
        "equivalent"
    }

    fn is_satisfied(&self, required: &str, available: &str, cmp: &dyn VersionComparator) -> bool {
        let (req, avail) = (MavenVersion::parse(required), MavenVersion::parse(available));
        req.major() == avail.major()
            && req.minor() == avail.minor()
            && cmp.compare(available, required) != Ordering::Less
    }
}

/// Same major as the requirement, and not older.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compatible;

impl MatchRule for Compatible {
    fn name(&self) -> &str {
        "compatible"
    }

    fn is_satisfied(&self, required: &str, available: &str, cmp: &dyn VersionComparator) -> bool {
        MavenVersion::parse(required).major() == MavenVersion::parse(available).major()
            && cmp.compare(available, required) != Ordering::Less
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterOrEqual;

impl MatchRule for GreaterOrEqual {
    fn name(&self) -> &str {
        "greater-or-equal"
    }

    fn is_satisfied(&self, required: &str, available: &str, cmp: &dyn VersionComparator) -> bool {
        cmp.compare(available, required) != Ordering::Less
    }
}

/// The requirement is a Maven range such as `[1.0,2.0)`.
///
/// A bare version falls back to [`GreaterOrEqual`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InRange;

impl MatchRule for InRange {
    fn name(&self) -> &str {
        "range"
    }

    fn is_satisfied(&self, required: &str, available: &str, cmp: &dyn VersionComparator) -> bool {
        match VersionRange::parse(required) {
            Some(range) => range.contains(available, cmp),
            None => GreaterOrEqual.is_satisfied(required, available, cmp),
        }
    }
}

/// The requirement is a semver requirement such as `^1.2` or `>=1, <3`.
///
/// Ignores the system comparator. Unparsable input never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverReq;

impl MatchRule for SemverReq {
    fn name(&self) -> &str {
        "semver"
    }

    fn is_satisfied(&self, required: &str, available: &str, _: &dyn VersionComparator) -> bool {
        match (
            semver::VersionReq::parse(required),
            semver::Version::parse(available),
        ) {
            (Ok(req), Ok(version)) => req.matches(&version),
            _ => false,
        }
    }
}

/// Shared instance of [`AnyVersion`].
pub fn any() -> SharedRule {
    Arc::new(AnyVersion)
}

/// Look up a built-in rule by the name used in universe files.
pub fn by_name(name: &str) -> Option<SharedRule> {
    let rule: SharedRule = match name {
        "any" => Arc::new(AnyVersion),
        "perfect" | "exact" => Arc::new(Perfect),
        "equivalent" => Arc::new(Equivalent),
        "compatible" => Arc::new(Compatible),
        "greater-or-equal" | ">=" => Arc::new(GreaterOrEqual),
        "range" => Arc::new(InRange),
        "semver" => Arc::new(SemverReq),
        _ => return None,
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::MavenOrdering;

    fn check(rule: &dyn MatchRule, required: &str, available: &str) -> bool {
        rule.is_satisfied(required, available, &MavenOrdering)
    }

    #[test]
    fn perfect_uses_comparator_equality() {
        assert!(check(&Perfect, "1.0", "1.0.0"));
        assert!(!check(&Perfect, "1.0", "1.0.1"));
    }

    #[test]
    fn equivalent_pins_major_and_minor() {
        assert!(check(&Equivalent, "1.2", "1.2.7"));
        assert!(!check(&Equivalent, "1.2", "1.3.0"));
        assert!(!check(&Equivalent, "1.2.5", "1.2.4"));
    }

    #[test]
    fn compatible_pins_major() {
        assert!(check(&Compatible, "1.2", "1.9"));
        assert!(!check(&Compatible, "1.2", "2.0"));
        assert!(!check(&Compatible, "1.2", "1.1"));
    }

    #[test]
    fn greater_or_equal() {
        assert!(check(&GreaterOrEqual, "2.0", "2.0"));
        assert!(check(&GreaterOrEqual, "2.0", "3.0"));
        assert!(!check(&GreaterOrEqual, "2.0", "1.0"));
    }

    #[test]
    fn range_and_bare_fallback() {
        assert!(check(&InRange, "[1.0,2.0)", "1.5"));
        assert!(!check(&InRange, "[1.0,2.0)", "2.0"));
        assert!(check(&InRange, "1.0", "4.0"));
    }

    #[test]
    fn semver_requirement() {
        assert!(check(&SemverReq, "^1.2", "1.4.0"));
        assert!(!check(&SemverReq, "^1.2", "2.0.0"));
        assert!(!check(&SemverReq, "not a req", "1.0.0"));
        assert!(!check(&SemverReq, "^1", "1.0"));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name(">=").unwrap().name(), "greater-or-equal");
        assert_eq!(by_name("exact").unwrap().name(), "perfect");
        assert!(by_name("newest").is_none());
    }
}
