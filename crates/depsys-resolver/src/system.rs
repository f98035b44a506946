//! The dependency system: owns every element set and runs resolves.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use depsys_core::comparator::{MavenOrdering, VersionComparator};
use depsys_core::config::ResolverConfig;
use depsys_core::element::Element;
use depsys_util::errors::DepsysError;

use crate::delta::{ElementStatus, ResolutionDelta};
use crate::element_set::{ElementSet, ResolvedDependency};
use crate::graph::SetGraph;
use crate::mark::{Mark, Phase};
use crate::policy::{self, AllSatisfied, SelectionPolicy};
use crate::visitor::{ElementSetVisitor, ResolutionVisitor, SatisfactionVisitor, SelectionVisitor};

/// Owns all element sets, keyed by identity, and resolves them.
///
/// Mutations and resolves must be serialized by the caller: the system does
/// no locking and a resolve runs to completion before anything else may
/// touch it.
pub struct DependencySystem {
    pub(crate) sets: BTreeMap<String, ElementSet>,
    pub(crate) comparator: Arc<dyn VersionComparator>,
    pub(crate) policy: Box<dyn SelectionPolicy>,
    /// Changes accumulated since the last resolve.
    pub(crate) delta: ResolutionDelta,
    last_delta: ResolutionDelta,
    epoch: u64,
    /// Set when a resolve aborted part way; the next one recomputes every
    /// set in every phase.
    stale: bool,
}

impl DependencySystem {
    pub fn new(comparator: Arc<dyn VersionComparator>, policy: Box<dyn SelectionPolicy>) -> Self {
        Self {
            sets: BTreeMap::new(),
            comparator,
            policy,
            delta: ResolutionDelta::new(),
            last_delta: ResolutionDelta::new(),
            epoch: 0,
            stale: false,
        }
    }

    pub fn with_config(config: &ResolverConfig) -> Self {
        Self::new(config.comparator(), policy::for_kind(config.policy))
    }

    /// Add an element, creating its set and the sets of everything it
    /// depends on as needed. Returns `false` if `id@version` was already
    /// present, in which case nothing changes.
    pub fn add_element(&mut self, element: Element) -> bool {
        let id = element.id().to_string();
        let set = self
            .sets
            .entry(id.clone())
            .or_insert_with(|| ElementSet::new(&id));
        if !set.add_element(element.clone(), &mut self.delta) {
            tracing::warn!("Ignoring duplicate element {element}");
            return false;
        }
        for dep in element.dependencies() {
            let required_id = dep.required_id();
            self.sets
                .entry(required_id.to_string())
                .or_insert_with(|| ElementSet::new(required_id))
                .add_requiring(&id);
        }
        true
    }

    pub fn add_elements(&mut self, elements: impl IntoIterator<Item = Element>) -> usize {
        elements
            .into_iter()
            .filter(|element| self.add_element(element.clone()))
            .count()
    }

    /// Remove the element with the same `id@version`. Returns whether it
    /// was present. Sets left empty and unreferenced are dropped.
    pub fn remove_element(&mut self, element: &Element) -> bool {
        let Some(set) = self.sets.get_mut(element.id()) else {
            return false;
        };
        let Some(removed) = set.remove_element(element.version(), &mut self.delta) else {
            return false;
        };
        for dep in removed.dependencies() {
            if let Some(target) = self.sets.get_mut(dep.required_id()) {
                target.remove_requiring(removed.id());
            }
            self.prune(dep.required_id());
        }
        self.prune(removed.id());
        true
    }

    pub fn remove_elements<'a>(&mut self, elements: impl IntoIterator<Item = &'a Element>) -> usize {
        elements
            .into_iter()
            .filter(|element| self.remove_element(element))
            .count()
    }

    fn prune(&mut self, id: &str) {
        if self.sets.get(id).is_some_and(ElementSet::is_unused) {
            tracing::trace!("Dropping unused element set {id}");
            self.sets.remove(id);
        }
    }

    /// The set for `id`, created empty if absent.
    pub fn get_element_set(&mut self, id: &str) -> &ElementSet {
        self.sets
            .entry(id.to_string())
            .or_insert_with(|| ElementSet::new(id))
    }

    pub fn element_set(&self, id: &str) -> Option<&ElementSet> {
        self.sets.get(id)
    }

    /// All sets, in identity order.
    pub fn element_sets(&self) -> impl Iterator<Item = &ElementSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Every resolved element, in identity then version order.
    pub fn resolved(&self) -> Vec<Element> {
        self.sets
            .values()
            .flat_map(|set| set.resolved().iter().cloned())
            .collect()
    }

    pub fn status(&self, element: &Element) -> ElementStatus {
        self.sets
            .get(element.id())
            .map_or(ElementStatus::Unknown, |set| set.status_of(element))
    }

    /// How each dependency of `element` resolved, in declaration order.
    pub fn resolved_dependencies(&self, element: &Element) -> Option<&[ResolvedDependency]> {
        self.sets
            .get(element.id())?
            .resolved_dependencies(element.version())
    }

    pub fn last_delta(&self) -> &ResolutionDelta {
        &self.last_delta
    }

    /// Changes recorded since the last resolve, not yet published.
    pub fn pending_delta(&self) -> &ResolutionDelta {
        &self.delta
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.comparator.compare(a, b)
    }

    pub fn comparator(&self) -> &dyn VersionComparator {
        &*self.comparator
    }

    /// Resolve and return the delta since the previous resolve.
    pub fn resolve(&mut self) -> Result<ResolutionDelta, DepsysError> {
        self.resolve_with(true)
    }

    /// Run the satisfaction, selection and resolution walks in turn.
    ///
    /// With `produce_delta` off, the changes of this call (including those
    /// recorded by mutations since the previous resolve) are discarded and
    /// an empty delta is published.
    ///
    /// On a cyclic failure the snapshots already recomputed by earlier
    /// phases stay in place; there is no rollback. Fix the graph and resolve
    /// again: that resolve recomputes every set from scratch.
    pub fn resolve_with(&mut self, produce_delta: bool) -> Result<ResolutionDelta, DepsysError> {
        if let Err(err) = self.walk() {
            self.stale = true;
            return Err(err);
        }
        self.stale = false;

        let delta = std::mem::take(&mut self.delta);
        self.last_delta = if produce_delta {
            delta
        } else {
            ResolutionDelta::new()
        };
        tracing::debug!("Resolve finished with {} changes", self.last_delta.len());
        Ok(self.last_delta.clone())
    }

    fn walk(&mut self) -> Result<(), DepsysError> {
        let roots: Vec<String> = self
            .sets
            .values()
            .filter(|set| set.is_root())
            .map(|set| set.id().to_string())
            .collect();
        tracing::debug!("Resolving {} element sets from {} roots", self.sets.len(), roots.len());
        if self.stale {
            tracing::debug!("Previous resolve aborted, recomputing every set");
        }

        let satisfied_leaves = self.visit(roots, &SatisfactionVisitor)?;
        let selected_roots = self.visit(satisfied_leaves, &SelectionVisitor)?;
        self.visit(selected_roots, &ResolutionVisitor)?;
        Ok(())
    }

    fn next_mark(&mut self, phase: Phase) -> Mark {
        self.epoch += 1;
        Mark::new(self.epoch, phase)
    }

    /// Level-by-level walk from `start`, returning the sets with no
    /// descendants.
    ///
    /// A set is processed only once all its ancestors have been visited
    /// under the current mark; until then it is dropped from the round and
    /// picked up again when its last ancestor enqueues it. A set is
    /// recomputed when it is pending an update, when it changed the last
    /// time it was visited by an earlier phase, when an ancestor changed
    /// during this walk, or after an aborted resolve. Sets never reached
    /// mean a cycle.
    fn visit<V: ElementSetVisitor>(
        &mut self,
        start: Vec<String>,
        visitor: &V,
    ) -> Result<Vec<String>, DepsysError> {
        let phase = visitor.phase();
        let mark = self.next_mark(phase);
        let mut frontier = start;
        let mut leaves = Vec::new();
        let mut visited = 0usize;
        let mut updated = 0usize;

        while !frontier.is_empty() {
            let mut next_level = Vec::new();
            for id in frontier {
                let Some(set) = self.sets.get(&id) else {
                    continue;
                };
                if set.visited_mark == mark {
                    continue;
                }

                let mut force = self.stale
                    || (set.visited_mark == set.changed_mark && set.visited_mark.precedes(phase));
                let mut ready = true;
                for ancestor in visitor.ancestors(set).ids() {
                    let Some(ancestor) = self.sets.get(ancestor) else {
                        continue;
                    };
                    if ancestor.visited_mark != mark {
                        ready = false;
                        break;
                    }
                    if ancestor.changed_mark == mark {
                        force = true;
                    }
                }
                if !ready {
                    continue;
                }
                let descendants: Vec<String> = visitor
                    .descendants(set)
                    .ids()
                    .map(str::to_string)
                    .collect();

                let Some(set) = self.sets.get_mut(&id) else {
                    continue;
                };
                set.visited_mark = mark;
                if force {
                    set.needing_update = Some(phase);
                }
                if set.needs_update(phase) {
                    set.needing_update = None;
                    visitor.update(self, &id, mark);
                    updated += 1;
                }
                visited += 1;
                tracing::trace!("{phase}: visited {id}");

                if descendants.is_empty() {
                    leaves.push(id);
                } else {
                    next_level.extend(descendants);
                }
            }
            frontier = next_level;
        }

        tracing::debug!(
            "{phase}: visited {visited}/{} sets, updated {updated}, {} leaves",
            self.sets.len(),
            leaves.len()
        );
        if visited != self.sets.len() {
            return Err(self.cyclic_error(mark));
        }
        Ok(leaves)
    }

    fn cyclic_error(&self, mark: Mark) -> DepsysError {
        let unvisited: Vec<String> = self
            .sets
            .values()
            .filter(|set| set.visited_mark != mark)
            .map(|set| set.id().to_string())
            .collect();
        let cycles = SetGraph::from_system(self).cycles();
        tracing::warn!("Aborting resolve: {} cycles among {:?}", cycles.len(), unvisited);
        DepsysError::CyclicDependency { cycles, unvisited }
    }
}

impl Default for DependencySystem {
    fn default() -> Self {
        Self::new(Arc::new(MavenOrdering), Box::new(AllSatisfied))
    }
}

impl fmt::Debug for DependencySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencySystem")
            .field("sets", &self.sets)
            .field("epoch", &self.epoch)
            .field("pending_changes", &self.delta.len())
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}
