//! One visitor per resolve phase.
//!
//! A visitor fixes the walk direction (which neighbours must be processed
//! first, which come next) and the rule that recomputes a set's snapshot for
//! its phase.

use std::collections::BTreeMap;

use depsys_core::comparator::VersionComparator;
use depsys_core::dependency::Dependency;
use depsys_core::element::Element;

use crate::element_set::{Edges, ElementSet, ResolvedDependency};
use crate::mark::{Mark, Phase};
use crate::policy;
use crate::system::DependencySystem;

pub(crate) trait ElementSetVisitor {
    fn phase(&self) -> Phase;

    /// Sets that must be visited before `set` in this walk.
    fn ancestors<'a>(&self, set: &'a ElementSet) -> &'a Edges;

    /// Sets to enqueue once `set` has been visited.
    fn descendants<'a>(&self, set: &'a ElementSet) -> &'a Edges;

    fn update(&self, system: &mut DependencySystem, id: &str, mark: Mark);
}

/// Walks from roots towards consumers, recomputing `satisfied`.
pub(crate) struct SatisfactionVisitor;

/// Walks from top consumers towards roots, recomputing `selected`.
pub(crate) struct SelectionVisitor;

/// Walks from roots towards consumers, recomputing `resolved`.
pub(crate) struct ResolutionVisitor;

impl ElementSetVisitor for SatisfactionVisitor {
    fn phase(&self) -> Phase {
        Phase::Satisfaction
    }

    fn ancestors<'a>(&self, set: &'a ElementSet) -> &'a Edges {
        set.required()
    }

    fn descendants<'a>(&self, set: &'a ElementSet) -> &'a Edges {
        set.requiring()
    }

    fn update(&self, system: &mut DependencySystem, id: &str, mark: Mark) {
        let Some(set) = system.sets.get(id) else {
            return;
        };
        let satisfied: Vec<Element> = if set.is_root() {
            set.available().cloned().collect()
        } else {
            set.available()
                .filter(|element| {
                    element
                        .dependencies()
                        .iter()
                        .filter(|dep| !dep.is_optional())
                        .all(|dep| {
                            has_match(&system.sets, dep, ElementSet::satisfied, &*system.comparator)
                        })
                })
                .cloned()
                .collect()
        };
        if let Some(set) = system.sets.get_mut(id) {
            if set.set_satisfied(satisfied, &*system.comparator, mark) {
                tracing::trace!("{id}: satisfied {:?}", versions(set.satisfied()));
            }
        }
    }
}

impl ElementSetVisitor for SelectionVisitor {
    fn phase(&self) -> Phase {
        Phase::Selection
    }

    fn ancestors<'a>(&self, set: &'a ElementSet) -> &'a Edges {
        set.requiring()
    }

    fn descendants<'a>(&self, set: &'a ElementSet) -> &'a Edges {
        set.required()
    }

    fn update(&self, system: &mut DependencySystem, id: &str, mark: Mark) {
        let Some(set) = system.sets.get(id) else {
            return;
        };
        let cmp = &*system.comparator;
        let selected = if set.satisfied().is_empty() {
            Vec::new()
        } else if set.allows_concurrency() {
            system.policy.select_multiple(set, cmp)
        } else {
            system.policy.select_single(set, cmp).into_iter().collect()
        };
        if let Some(set) = system.sets.get_mut(id) {
            if set.set_selected(selected, &*system.comparator, mark) {
                tracing::trace!("{id}: selected {:?}", versions(set.selected()));
            }
        }
    }
}

impl ElementSetVisitor for ResolutionVisitor {
    fn phase(&self) -> Phase {
        Phase::Resolution
    }

    fn ancestors<'a>(&self, set: &'a ElementSet) -> &'a Edges {
        set.required()
    }

    fn descendants<'a>(&self, set: &'a ElementSet) -> &'a Edges {
        set.requiring()
    }

    fn update(&self, system: &mut DependencySystem, id: &str, mark: Mark) {
        let Some(set) = system.sets.get(id) else {
            return;
        };
        let cmp = &*system.comparator;
        let mut resolved = Vec::new();
        let mut resolutions = BTreeMap::new();

        for element in set.selected() {
            let previous = set.previous_resolutions(element.version());
            let mut complete = true;
            let mut dependencies = Vec::with_capacity(element.dependencies().len());

            for (index, dep) in element.dependencies().iter().enumerate() {
                let version = system
                    .sets
                    .get(dep.required_id())
                    .and_then(|required| {
                        policy::highest(
                            required.resolved().iter().filter(|e| dep.matches(e.version(), cmp)),
                            cmp,
                        )
                    })
                    .map(|e| e.version().to_string());

                if version.is_none() && !dep.is_optional() {
                    complete = false;
                }
                let changed = match previous.and_then(|deps| deps.get(index)) {
                    Some(prev) if prev.required_id == dep.required_id() && prev.version == version => {
                        prev.changed
                    }
                    _ => mark,
                };
                dependencies.push(ResolvedDependency {
                    required_id: dep.required_id().to_string(),
                    version,
                    changed,
                });
            }

            resolutions.insert(element.version().to_string(), dependencies);
            if complete {
                resolved.push(element.clone());
            }
        }

        let DependencySystem {
            sets,
            comparator,
            delta,
            ..
        } = system;
        if let Some(set) = sets.get_mut(id) {
            if set.set_resolved(resolved, resolutions, &**comparator, mark, delta) {
                tracing::trace!("{id}: resolved {:?}", versions(set.resolved()));
            }
        }
    }
}

/// Does the set `dep` points at hold a version in `snapshot` that matches?
fn has_match(
    sets: &BTreeMap<String, ElementSet>,
    dep: &Dependency,
    snapshot: fn(&ElementSet) -> &[Element],
    cmp: &dyn VersionComparator,
) -> bool {
    sets.get(dep.required_id()).is_some_and(|required| {
        snapshot(required)
            .iter()
            .any(|e| dep.matches(e.version(), cmp))
    })
}

fn versions(snapshot: &[Element]) -> Vec<&str> {
    snapshot.iter().map(Element::version).collect()
}
