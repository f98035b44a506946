//! The change log produced by a resolve.

use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use depsys_core::element::Element;

/// Resolution status of an element as seen by the delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementStatus {
    /// Not part of the system.
    Unknown,
    /// Known but not resolved.
    Unresolved,
    Resolved,
}

impl fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementStatus::Unknown => "UNKNOWN",
            ElementStatus::Unresolved => "UNRESOLVED",
            ElementStatus::Resolved => "RESOLVED",
        })
    }
}

/// The net transition recorded for one `id@version`.
///
/// A change with equal old and new status only survives in a delta when
/// `dependencies_changed` is set: the element stayed resolved but one of its
/// dependencies now resolves to a different version.
#[derive(Debug, Clone)]
pub struct ElementChange {
    element: Element,
    old_status: ElementStatus,
    new_status: ElementStatus,
    dependencies_changed: bool,
}

impl ElementChange {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn old_status(&self) -> ElementStatus {
        self.old_status
    }

    pub fn new_status(&self) -> ElementStatus {
        self.new_status
    }

    pub fn dependencies_changed(&self) -> bool {
        self.dependencies_changed
    }

    /// Resolved before and after, with only dependency versions moving.
    pub fn is_dependency_only(&self) -> bool {
        self.old_status == self.new_status && self.dependencies_changed
    }

    fn is_noop(&self) -> bool {
        self.old_status == self.new_status && !self.dependencies_changed
    }
}

impl fmt::Display for ElementChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dependency_only() {
            return write!(f, "{}: DEPENDENCY", self.element);
        }
        write!(
            f,
            "{}: {} -> {}",
            self.element, self.old_status, self.new_status
        )?;
        if self.dependencies_changed {
            f.write_str(" (dependencies changed)")?;
        }
        Ok(())
    }
}

impl Serialize for ElementChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut change = serializer.serialize_struct("ElementChange", 5)?;
        change.serialize_field("id", self.element.id())?;
        change.serialize_field("version", self.element.version())?;
        change.serialize_field("from", &self.old_status)?;
        change.serialize_field("to", &self.new_status)?;
        change.serialize_field("dependencies_changed", &self.dependencies_changed)?;
        change.end()
    }
}

/// All element changes accumulated between two resolves, keyed by
/// `(id, version)`.
///
/// Successive transitions of the same element collapse into one change from
/// the first old status to the last new status; a change that ends where it
/// started is dropped.
#[derive(Debug, Clone, Default)]
pub struct ResolutionDelta {
    changes: BTreeMap<(String, String), ElementChange>,
}

impl ResolutionDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn get(&self, id: &str, version: &str) -> Option<&ElementChange> {
        self.changes.get(&(id.to_string(), version.to_string()))
    }

    /// Changes in `(id, version)` order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementChange> {
        self.changes.values()
    }

    pub(crate) fn record_transition(
        &mut self,
        element: &Element,
        from: ElementStatus,
        to: ElementStatus,
    ) {
        match self.changes.entry(key(element)) {
            Entry::Occupied(mut entry) => {
                let change = entry.get_mut();
                change.new_status = to;
                change.element = element.clone();
                if change.is_noop() {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                if from != to {
                    entry.insert(ElementChange {
                        element: element.clone(),
                        old_status: from,
                        new_status: to,
                        dependencies_changed: false,
                    });
                }
            }
        }
    }

    pub(crate) fn record_dependency_change(&mut self, element: &Element) {
        self.changes
            .entry(key(element))
            .or_insert_with(|| ElementChange {
                element: element.clone(),
                old_status: ElementStatus::Resolved,
                new_status: ElementStatus::Resolved,
                dependencies_changed: false,
            })
            .dependencies_changed = true;
    }
}

fn key(element: &Element) -> (String, String) {
    (element.id().to_string(), element.version().to_string())
}

impl fmt::Display for ResolutionDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changes.is_empty() {
            return write!(f, "No changes.");
        }
        writeln!(f, "Changes ({}):", self.changes.len())?;
        for change in self.changes.values() {
            writeln!(f, "  {change}")?;
        }
        Ok(())
    }
}

impl Serialize for ResolutionDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.changes.len()))?;
        for change in self.changes.values() {
            seq.serialize_element(change)?;
        }
        seq.end()
    }
}
