//! Selection policies: which satisfied versions become selected.

use std::cmp::Ordering;

use depsys_core::comparator::VersionComparator;
use depsys_core::config::PolicyKind;
use depsys_core::element::Element;

use crate::element_set::ElementSet;

/// Chooses among the satisfied versions of a set.
///
/// Both methods must be pure functions of `set.satisfied()` (and the
/// comparator). `select_multiple` is used when the set allows several
/// versions at once, `select_single` when it holds a singleton.
pub trait SelectionPolicy: Send + Sync {
    fn select_multiple(&self, set: &ElementSet, cmp: &dyn VersionComparator) -> Vec<Element>;

    fn select_single(&self, set: &ElementSet, cmp: &dyn VersionComparator) -> Option<Element>;
}

/// Keep every satisfied version; for singleton sets, the highest one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllSatisfied;

impl SelectionPolicy for AllSatisfied {
    fn select_multiple(&self, set: &ElementSet, _: &dyn VersionComparator) -> Vec<Element> {
        set.satisfied().to_vec()
    }

    fn select_single(&self, set: &ElementSet, cmp: &dyn VersionComparator) -> Option<Element> {
        highest(set.satisfied(), cmp).cloned()
    }
}

/// Keep only the highest satisfied version, singleton or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestOnly;

impl SelectionPolicy for HighestOnly {
    fn select_multiple(&self, set: &ElementSet, cmp: &dyn VersionComparator) -> Vec<Element> {
        highest(set.satisfied(), cmp).cloned().into_iter().collect()
    }

    fn select_single(&self, set: &ElementSet, cmp: &dyn VersionComparator) -> Option<Element> {
        highest(set.satisfied(), cmp).cloned()
    }
}

pub fn for_kind(kind: PolicyKind) -> Box<dyn SelectionPolicy> {
    match kind {
        PolicyKind::AllSatisfied => Box::new(AllSatisfied),
        PolicyKind::Highest => Box::new(HighestOnly),
    }
}

/// The highest version per `cmp`. Among versions the comparator considers
/// equal, the first one in iteration order wins.
pub fn highest<'a>(
    elements: impl IntoIterator<Item = &'a Element>,
    cmp: &dyn VersionComparator,
) -> Option<&'a Element> {
    elements.into_iter().fold(None, |best, candidate| match best {
        Some(current) if cmp.compare(candidate.version(), current.version()) != Ordering::Greater => {
            Some(current)
        }
        _ => Some(candidate),
    })
}
