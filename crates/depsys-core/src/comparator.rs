//! Pluggable total orders over version strings.

use std::cmp::Ordering;

use crate::version::MavenVersion;

/// An opaque total order over version strings.
///
/// The resolver never interprets versions itself; every "highest" or
/// "at least" decision goes through the comparator installed in the system.
/// Plain functions and closures of type `Fn(&str, &str) -> Ordering` can be
/// used directly.
pub trait VersionComparator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

impl<F> VersionComparator for F
where
    F: Fn(&str, &str) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self(a, b)
    }
}

/// Maven ordering, see [`MavenVersion`]. The default comparator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MavenOrdering;

impl VersionComparator for MavenOrdering {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        MavenVersion::parse(a).cmp(&MavenVersion::parse(b))
    }
}

/// Semver precedence.
///
/// Strings that are not valid semver sort below every valid version and are
/// ordered among themselves by [`MavenOrdering`], which keeps the order total.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverOrdering;

impl VersionComparator for SemverOrdering {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match (semver::Version::parse(a), semver::Version::parse(b)) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => MavenOrdering.compare(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maven_ordering_ignores_trailing_zeros() {
        assert_eq!(MavenOrdering.compare("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(MavenOrdering.compare("1.10", "1.9"), Ordering::Greater);
    }

    #[test]
    fn semver_prerelease_precedence() {
        assert_eq!(
            SemverOrdering.compare("1.0.0-alpha", "1.0.0"),
            Ordering::Less
        );
        assert_eq!(SemverOrdering.compare("2.0.0", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn semver_invalid_sorts_first() {
        assert_eq!(SemverOrdering.compare("1.0", "0.0.1"), Ordering::Less);
        assert_eq!(SemverOrdering.compare("2.0", "1.0"), Ordering::Greater);
    }

    #[test]
    fn closures_are_comparators() {
        let lexical = |a: &str, b: &str| a.cmp(b);
        assert_eq!(lexical.compare("10", "9"), Ordering::Less);
    }
}
