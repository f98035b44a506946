//! Operation: per-identity report of what each phase kept, and why the
//! remaining elements did not resolve.

use std::fmt::Write;
use std::path::Path;

use depsys_core::comparator::VersionComparator;
use depsys_core::element::Element;
use depsys_resolver::{DependencySystem, ElementSet, ElementStatus};
use depsys_util::errors::DepsysResult;
use depsys_util::progress;

use crate::load_system;

/// Resolve `path` and print its status report.
pub fn status(path: &Path) -> DepsysResult<()> {
    print!("{}", render(path)?);
    Ok(())
}

pub fn render(path: &Path) -> DepsysResult<String> {
    let mut loaded = load_system(path, None)?;
    loaded.system.resolve_with(false)?;
    let report = report(&loaded.system);

    let unresolved = loaded
        .system
        .element_sets()
        .flat_map(|set| set.available())
        .filter(|e| loaded.system.status(e) == ElementStatus::Unresolved)
        .count();
    if unresolved > 0 {
        progress::status_warn("Unresolved", &format!("{unresolved} elements"));
    }
    Ok(report)
}

/// Text report for an already resolved system.
pub fn report(system: &DependencySystem) -> String {
    let cmp = system.comparator();
    let mut out = String::new();
    for set in system.element_sets() {
        let mut available: Vec<&Element> = set.available().collect();
        available.sort_by(|a, b| {
            cmp.compare(a.version(), b.version())
                .then_with(|| a.version().cmp(b.version()))
        });

        let _ = writeln!(out, "{}", set.id());
        line(&mut out, "available", available.iter().copied());
        line(&mut out, "satisfied", set.satisfied());
        line(&mut out, "selected", set.selected());
        line(&mut out, "resolved", set.resolved());

        for element in available {
            if let Some(reason) = unresolved_reason(system, set, element) {
                let _ = writeln!(out, "  ! {element}: {reason}");
            }
        }
    }
    out
}

fn line<'a>(out: &mut String, label: &str, elements: impl IntoIterator<Item = &'a Element>) {
    let versions: Vec<&str> = elements.into_iter().map(Element::version).collect();
    let listed = if versions.is_empty() {
        "-".to_string()
    } else {
        versions.join(", ")
    };
    let _ = writeln!(out, "  {label:<10} {listed}");
}

/// Why `element` is not resolved, or `None` if it is.
fn unresolved_reason(system: &DependencySystem, set: &ElementSet, element: &Element) -> Option<String> {
    if system.status(element) == ElementStatus::Resolved {
        return None;
    }
    let cmp = system.comparator();
    let is_in = |snapshot: &[Element]| snapshot.iter().any(|e| e.is_same(element));

    if !is_in(set.satisfied()) {
        let missing = first_unmatched(system, element, ElementSet::satisfied, cmp);
        return Some(match missing {
            Some(dep) => format!("no satisfied match for {dep}"),
            None => "not satisfied".to_string(),
        });
    }
    if !is_in(set.selected()) {
        return Some("not selected".to_string());
    }
    let missing = first_unmatched(system, element, ElementSet::resolved, cmp);
    Some(match missing {
        Some(dep) => format!("no resolved match for {dep}"),
        None => "not resolved".to_string(),
    })
}

/// First mandatory dependency of `element` with no match in `snapshot` of
/// its target set.
fn first_unmatched(
    system: &DependencySystem,
    element: &Element,
    snapshot: fn(&ElementSet) -> &[Element],
    cmp: &dyn VersionComparator,
) -> Option<String> {
    element
        .dependencies()
        .iter()
        .filter(|dep| !dep.is_optional())
        .find(|dep| {
            !system.element_set(dep.required_id()).is_some_and(|target| {
                snapshot(target)
                    .iter()
                    .any(|e| dep.matches(e.version(), cmp))
            })
        })
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsys_core::dependency::Dependency;
    use depsys_core::match_rule::by_name;

    #[test]
    fn reports_missing_dependency() {
        let mut system = DependencySystem::default();
        system.add_element(Element::new(
            "app",
            "1",
            vec![Dependency::versioned("lib", "2.0", by_name(">=").unwrap())],
            false,
        ));
        system.add_element(Element::new("lib", "1.0", vec![], false));
        system.resolve().unwrap();

        let out = report(&system);
        assert!(out.contains("app\n  available  1\n  satisfied  -\n"));
        assert!(out.contains("  ! app@1: no satisfied match for lib greater-or-equal 2.0"));
        assert!(out.contains("lib\n  available  1.0\n"));
    }

    #[test]
    fn lists_versions_in_version_order() {
        let mut system = DependencySystem::default();
        for v in ["1.10", "1.9", "1.2"] {
            system.add_element(Element::new("lib", v, vec![], false));
        }
        system.resolve().unwrap();

        let out = report(&system);
        assert!(out.contains("  available  1.2, 1.9, 1.10
"), "{out}");
        assert!(out.contains("  resolved   1.2, 1.9, 1.10
"), "{out}");
    }

    #[test]
    fn reports_unselected_singleton() {
        let mut system = DependencySystem::default();
        system.add_element(Element::new("a", "1", vec![], true));
        system.add_element(Element::new("a", "2", vec![], true));
        system.resolve().unwrap();

        let out = report(&system);
        assert!(out.contains("  ! a@1: not selected"));
        assert!(!out.contains("a@2:"));
    }
}
