use depsys_core::dependency::Dependency;
use depsys_core::element::Element;
use depsys_core::match_rule::by_name;
use depsys_resolver::{DependencySystem, ElementStatus};

fn element(id: &str, version: &str, deps: Vec<Dependency>) -> Element {
    Element::new(id, version, deps, false)
}

fn versioned(id: &str, version: &str, rule: &str) -> Dependency {
    Dependency::versioned(id, version, by_name(rule).unwrap())
}

fn at_least(id: &str, version: &str) -> Dependency {
    versioned(id, version, ">=")
}

fn resolved(elements: Vec<Element>) -> DependencySystem {
    let mut system = DependencySystem::default();
    system.add_elements(elements);
    system.resolve().unwrap();
    system
}

#[test]
fn new_version_reports_dependency_change() {
    let a = element("a", "1", vec![Dependency::on("b")]);
    let mut system = resolved(vec![a.clone(), element("b", "1", vec![])]);
    assert_eq!(system.resolved_dependencies(&a).unwrap()[0].version(), Some("1"));

    system.add_element(element("b", "2", vec![]));
    let delta = system.resolve().unwrap();

    assert_eq!(delta.len(), 2);
    let b2 = delta.get("b", "2").unwrap();
    assert_eq!(b2.old_status(), ElementStatus::Unknown);
    assert_eq!(b2.new_status(), ElementStatus::Resolved);
    let a1 = delta.get("a", "1").unwrap();
    assert!(a1.is_dependency_only());
    assert_eq!(system.resolved_dependencies(&a).unwrap()[0].version(), Some("2"));
}

#[test]
fn unrelated_addition_leaves_consumers_alone() {
    let mut system = resolved(vec![
        element("a", "1", vec![Dependency::on("b")]),
        element("b", "1", vec![]),
    ]);

    system.add_element(element("c", "1", vec![]));
    let delta = system.resolve().unwrap();

    assert_eq!(delta.len(), 1);
    assert!(delta.get("c", "1").is_some());
}

#[test]
fn removing_last_provider_unresolves_consumer() {
    let a = element("a", "1", vec![Dependency::on("b")]);
    let b1 = element("b", "1", vec![]);
    let b2 = element("b", "2", vec![]);
    let mut system = resolved(vec![a.clone(), b1.clone(), b2.clone()]);

    assert_eq!(system.remove_elements([&b1, &b2]), 2);
    let delta = system.resolve().unwrap();

    assert_eq!(system.status(&a), ElementStatus::Unresolved);
    let a1 = delta.get("a", "1").unwrap();
    assert_eq!(a1.old_status(), ElementStatus::Resolved);
    assert_eq!(a1.new_status(), ElementStatus::Unresolved);
    for v in ["1", "2"] {
        let change = delta.get("b", v).unwrap();
        assert_eq!(change.old_status(), ElementStatus::Resolved);
        assert_eq!(change.new_status(), ElementStatus::Unknown);
    }
    // still referenced by a@1
    assert!(system.element_set("b").unwrap().is_empty());
}

#[test]
fn removing_one_of_two_providers_moves_dependency() {
    let a = element("a", "1", vec![Dependency::on("b")]);
    let b2 = element("b", "2", vec![]);
    let mut system = resolved(vec![a.clone(), element("b", "1", vec![]), b2.clone()]);

    system.remove_element(&b2);
    let delta = system.resolve().unwrap();

    assert_eq!(system.status(&a), ElementStatus::Resolved);
    assert!(delta.get("a", "1").unwrap().is_dependency_only());
    assert_eq!(system.resolved_dependencies(&a).unwrap()[0].version(), Some("1"));
}

#[test]
fn replacing_with_identical_element_cancels_out() {
    let b1 = element("b", "1", vec![]);
    let mut system = resolved(vec![
        element("a", "1", vec![Dependency::on("b")]),
        b1.clone(),
        element("b", "2", vec![]),
    ]);

    system.remove_element(&b1);
    let replacement = element("b", "1", vec![]);
    system.add_element(replacement.clone());
    assert!(!system.pending_delta().is_empty());

    let delta = system.resolve().unwrap();
    assert!(delta.is_empty(), "{delta}");
    assert_eq!(system.status(&replacement), ElementStatus::Resolved);
    assert_eq!(system.status(&b1), ElementStatus::Unknown);
}

#[test]
fn replaced_element_reports_dependency_move() {
    let app = element("app", "1", vec![at_least("lib", "1")]);
    let mut system = resolved(vec![
        app.clone(),
        element("lib", "1", vec![]),
        element("lib", "2", vec![]),
    ]);
    assert_eq!(system.resolved_dependencies(&app).unwrap()[0].version(), Some("2"));

    let pinned = element("app", "1", vec![versioned("lib", "1", "perfect")]);
    assert!(system.remove_element(&app));
    assert!(system.add_element(pinned.clone()));
    let delta = system.resolve().unwrap();

    assert_eq!(system.resolved_dependencies(&pinned).unwrap()[0].version(), Some("1"));
    assert_eq!(delta.len(), 1, "{delta}");
    let change = delta.get("app", "1").unwrap();
    assert!(change.is_dependency_only());
    assert!(change.element().is_same(&pinned));
}

#[test]
fn replaced_element_with_same_resolutions_is_silent() {
    let app = element("app", "1", vec![at_least("lib", "1")]);
    let mut system = resolved(vec![app.clone(), element("lib", "2", vec![])]);

    let relaxed = element("app", "1", vec![versioned("lib", "2", "compatible")]);
    system.remove_element(&app);
    system.add_element(relaxed.clone());
    let delta = system.resolve().unwrap();

    assert_eq!(system.status(&relaxed), ElementStatus::Resolved);
    assert!(delta.is_empty(), "{delta}");
}

#[test]
fn add_then_remove_before_resolve_leaves_no_trace() {
    let mut system = resolved(vec![element("a", "1", vec![])]);
    let extra = element("x", "1", vec![Dependency::on("y")]);

    system.add_element(extra.clone());
    assert_eq!(system.len(), 3);
    system.remove_element(&extra);
    assert_eq!(system.len(), 1);

    assert!(system.resolve().unwrap().is_empty());
}

#[test]
fn unused_sets_are_pruned() {
    let a = element("a", "1", vec![Dependency::on("ghost")]);
    let mut system = resolved(vec![a.clone()]);
    assert_eq!(system.len(), 2);

    assert!(system.remove_element(&a));
    assert!(system.is_empty());
    assert!(!system.remove_element(&a));

    let delta = system.resolve().unwrap();
    let change = delta.get("a", "1").unwrap();
    assert_eq!(change.old_status(), ElementStatus::Unresolved);
    assert_eq!(change.new_status(), ElementStatus::Unknown);
}

#[test]
fn shared_edge_survives_partial_removal() {
    let a1 = element("a", "1", vec![Dependency::on("b")]);
    let a2 = element("a", "2", vec![Dependency::on("b")]);
    let mut system = resolved(vec![a1.clone(), a2.clone(), element("b", "1", vec![])]);

    system.remove_element(&a1);
    let b = system.element_set("b").unwrap();
    assert!(b.requiring().contains("a"));
    assert_eq!(b.requiring().count("a"), 1);

    system.resolve().unwrap();
    assert_eq!(system.status(&a2), ElementStatus::Resolved);
}

#[test]
fn disabled_delta_discards_pending_changes() {
    let mut system = DependencySystem::default();
    let a = element("a", "1", vec![]);
    system.add_element(a.clone());

    let delta = system.resolve_with(false).unwrap();
    assert!(delta.is_empty());
    assert!(system.last_delta().is_empty());
    assert_eq!(system.status(&a), ElementStatus::Resolved);

    assert!(system.resolve().unwrap().is_empty());
}

#[test]
fn last_delta_tracks_most_recent_resolve() {
    let mut system = resolved(vec![element("a", "1", vec![])]);
    assert_eq!(system.last_delta().len(), 1);

    system.add_element(element("a", "2", vec![]));
    system.resolve().unwrap();
    assert_eq!(system.last_delta().len(), 1);
    assert!(system.last_delta().get("a", "2").is_some());
}

#[test]
fn long_chain_settles_in_one_resolve() {
    let mut elements = vec![element("n0", "1", vec![])];
    for i in 1..50 {
        elements.push(element(&format!("n{i}"), "1", vec![Dependency::on(format!("n{}", i - 1))]));
    }
    let mut system = resolved(elements);
    assert_eq!(system.resolved().len(), 50);

    system.add_element(element("n0", "2", vec![]));
    let delta = system.resolve().unwrap();
    assert!(delta.get("n1", "1").unwrap().is_dependency_only());
    assert!(delta.get("n2", "1").is_none());
    assert_eq!(delta.len(), 2);
}
