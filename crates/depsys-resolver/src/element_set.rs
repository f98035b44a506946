//! All known versions of one identity, plus the per-phase results.

use std::collections::BTreeMap;

use depsys_core::comparator::VersionComparator;
use depsys_core::element::Element;

use crate::delta::{ElementStatus, ResolutionDelta};
use crate::mark::{Mark, Phase};

/// Reference-counted edges from one element set to other identities.
///
/// Several versions of an identity may depend on the same target; the edge
/// only goes away when the last of those dependencies is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edges {
    counts: BTreeMap<String, usize>,
}

impl Edges {
    /// Returns `true` when this created a new edge.
    pub(crate) fn add(&mut self, id: &str) -> bool {
        let count = self.counts.entry(id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Returns `true` when this dropped the edge.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let Some(count) = self.counts.get_mut(id) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.counts.contains_key(id)
    }

    /// Number of dependencies currently backing the edge to `id`.
    pub fn count(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

/// The version one dependency resolved to, and the mark of the resolve that
/// last changed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub(crate) required_id: String,
    pub(crate) version: Option<String>,
    pub(crate) changed: Mark,
}

impl ResolvedDependency {
    pub fn required_id(&self) -> &str {
        &self.required_id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn changed_mark(&self) -> Mark {
        self.changed
    }
}

/// Every known version of one identity.
///
/// The three result snapshots are replaced wholesale by the resolve phases
/// and always hold elements in version order. After a completed
/// resolve, `resolved ⊆ selected ⊆ satisfied ⊆ available`.
#[derive(Debug, Clone)]
pub struct ElementSet {
    id: String,
    available: BTreeMap<String, Element>,
    required: Edges,
    requiring: Edges,
    satisfied: Vec<Element>,
    selected: Vec<Element>,
    resolved: Vec<Element>,
    /// Per selected version, one entry per declared dependency.
    resolutions: BTreeMap<String, Vec<ResolvedDependency>>,
    /// Resolutions of resolved versions removed since the last resolution
    /// pass, so a same-version replacement can report dependency moves.
    retired: BTreeMap<String, Vec<ResolvedDependency>>,
    singletons: usize,
    pub(crate) visited_mark: Mark,
    pub(crate) changed_mark: Mark,
    pub(crate) needing_update: Option<Phase>,
}

impl ElementSet {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            available: BTreeMap::new(),
            required: Edges::default(),
            requiring: Edges::default(),
            satisfied: Vec::new(),
            selected: Vec::new(),
            resolved: Vec::new(),
            resolutions: BTreeMap::new(),
            retired: BTreeMap::new(),
            singletons: 0,
            visited_mark: Mark::NONE,
            changed_mark: Mark::NONE,
            needing_update: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, version: &str) -> Option<&Element> {
        self.available.get(version)
    }

    /// All known versions, in version-string order.
    pub fn available(&self) -> impl Iterator<Item = &Element> {
        self.available.values()
    }

    /// Identities this set depends on.
    pub fn required(&self) -> &Edges {
        &self.required
    }

    /// Identities that depend on this set.
    pub fn requiring(&self) -> &Edges {
        &self.requiring
    }

    pub fn satisfied(&self) -> &[Element] {
        &self.satisfied
    }

    pub fn selected(&self) -> &[Element] {
        &self.selected
    }

    pub fn resolved(&self) -> &[Element] {
        &self.resolved
    }

    pub fn singletons_count(&self) -> usize {
        self.singletons
    }

    /// Whether several versions may be selected at once.
    pub fn allows_concurrency(&self) -> bool {
        self.singletons == 0
    }

    pub fn is_root(&self) -> bool {
        self.required.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn visited_mark(&self) -> Mark {
        self.visited_mark
    }

    pub fn changed_mark(&self) -> Mark {
        self.changed_mark
    }

    /// No versions and no edges in either direction.
    pub(crate) fn is_unused(&self) -> bool {
        self.available.is_empty() && self.required.is_empty() && self.requiring.is_empty()
    }

    pub(crate) fn needs_update(&self, phase: Phase) -> bool {
        self.needing_update.is_some_and(|pending| pending <= phase)
    }

    pub fn status_of(&self, element: &Element) -> ElementStatus {
        match self.available.get(element.version()) {
            Some(known) if known.is_same(element) => {
                if contains_same(&self.resolved, element) {
                    ElementStatus::Resolved
                } else {
                    ElementStatus::Unresolved
                }
            }
            _ => ElementStatus::Unknown,
        }
    }

    /// How each dependency of `version` resolved, in declaration order.
    ///
    /// `None` until `version` has been selected by a resolve.
    pub fn resolved_dependencies(&self, version: &str) -> Option<&[ResolvedDependency]> {
        self.resolutions.get(version).map(Vec::as_slice)
    }

    /// The resolutions to diff a freshly computed `version` against: its
    /// current ones, or those of a resolved version it replaced.
    pub(crate) fn previous_resolutions(&self, version: &str) -> Option<&[ResolvedDependency]> {
        self.resolutions
            .get(version)
            .or_else(|| self.retired.get(version))
            .map(Vec::as_slice)
    }

    /// Add a version. Returns `false` if the version is already known.
    pub(crate) fn add_element(&mut self, element: Element, delta: &mut ResolutionDelta) -> bool {
        if self.available.contains_key(element.version()) {
            return false;
        }
        for dep in element.dependencies() {
            self.required.add(dep.required_id());
        }
        if element.is_singleton() {
            self.singletons += 1;
        }
        delta.record_transition(&element, ElementStatus::Unknown, ElementStatus::Unresolved);
        self.available.insert(element.version().to_string(), element);
        self.needing_update = Some(Phase::Satisfaction);
        true
    }

    pub(crate) fn remove_element(
        &mut self,
        version: &str,
        delta: &mut ResolutionDelta,
    ) -> Option<Element> {
        let element = self.available.remove(version)?;
        for dep in element.dependencies() {
            self.required.remove(dep.required_id());
        }
        if element.is_singleton() {
            self.singletons -= 1;
        }
        let status = if contains_same(&self.resolved, &element) {
            ElementStatus::Resolved
        } else {
            ElementStatus::Unresolved
        };
        delta.record_transition(&element, status, ElementStatus::Unknown);
        if let Some(resolutions) = self.resolutions.remove(version) {
            if status == ElementStatus::Resolved {
                self.retired.insert(version.to_string(), resolutions);
            }
        }
        self.needing_update = Some(Phase::Satisfaction);
        Some(element)
    }

    pub(crate) fn add_requiring(&mut self, id: &str) {
        self.requiring.add(id);
    }

    pub(crate) fn remove_requiring(&mut self, id: &str) {
        self.requiring.remove(id);
    }

    /// Returns `true` if the snapshot changed, in which case `changed_mark`
    /// is stamped with `mark`.
    pub(crate) fn set_satisfied(
        &mut self,
        satisfied: Vec<Element>,
        cmp: &dyn VersionComparator,
        mark: Mark,
    ) -> bool {
        replace_snapshot(&mut self.satisfied, satisfied, cmp, &mut self.changed_mark, mark)
    }

    pub(crate) fn set_selected(
        &mut self,
        selected: Vec<Element>,
        cmp: &dyn VersionComparator,
        mark: Mark,
    ) -> bool {
        replace_snapshot(&mut self.selected, selected, cmp, &mut self.changed_mark, mark)
    }

    /// Install a new resolved snapshot and the dependency resolutions of
    /// every selected version, recording status transitions in `delta`.
    ///
    /// Dependency changes of elements that stay resolved are recorded even
    /// when membership is unchanged, and so are those of a replacement for
    /// a removed resolved version. Only membership changes stamp
    /// `changed_mark`.
    pub(crate) fn set_resolved(
        &mut self,
        mut resolved: Vec<Element>,
        resolutions: BTreeMap<String, Vec<ResolvedDependency>>,
        cmp: &dyn VersionComparator,
        mark: Mark,
        delta: &mut ResolutionDelta,
    ) -> bool {
        sort_snapshot(&mut resolved, cmp);
        let moved = |version: &str| {
            resolutions
                .get(version)
                .is_some_and(|deps| deps.iter().any(|dep| dep.changed == mark))
        };

        for old in &self.resolved {
            let still_known = self
                .available
                .get(old.version())
                .is_some_and(|known| known.is_same(old));
            if still_known && !contains_same(&resolved, old) {
                delta.record_transition(old, ElementStatus::Resolved, ElementStatus::Unresolved);
            }
        }
        for new in &resolved {
            if !contains_same(&self.resolved, new) {
                delta.record_transition(new, ElementStatus::Unresolved, ElementStatus::Resolved);
                if self.retired.contains_key(new.version()) && moved(new.version()) {
                    delta.record_dependency_change(new);
                }
            } else if moved(new.version()) {
                delta.record_dependency_change(new);
            }
        }
        self.resolutions = resolutions;
        self.retired.clear();

        if same_snapshot(&self.resolved, &resolved) {
            return false;
        }
        self.resolved = resolved;
        self.changed_mark = mark;
        true
    }
}

/// Version order, falling back to the strings for versions the comparator
/// deems equal.
fn sort_snapshot(snapshot: &mut [Element], cmp: &dyn VersionComparator) {
    snapshot.sort_by(|a, b| {
        cmp.compare(a.version(), b.version())
            .then_with(|| a.version().cmp(b.version()))
    });
}

fn contains_same(snapshot: &[Element], element: &Element) -> bool {
    snapshot.iter().any(|e| e.is_same(element))
}

fn same_snapshot(a: &[Element], b: &[Element]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_same(y))
}

fn replace_snapshot(
    current: &mut Vec<Element>,
    mut next: Vec<Element>,
    cmp: &dyn VersionComparator,
    changed_mark: &mut Mark,
    mark: Mark,
) -> bool {
    sort_snapshot(&mut next, cmp);
    if same_snapshot(current, &next) {
        return false;
    }
    *current = next;
    *changed_mark = mark;
    true
}
