use std::path::PathBuf;

use depsys_ops::ops_resolve::ResolveOptions;
use depsys_ops::ops_tree::TreeOptions;
use depsys_ops::{load_system, ops_diff, ops_resolve, ops_status, ops_tree};
use depsys_resolver::ElementStatus;
use tempfile::TempDir;

const UNIVERSE: &str = r#"
[[element]]
id = "app"
version = "1.0"
dependencies = [
  { id = "lib", version = "2.0", match = ">=" },
  { id = "log", optional = true },
]

[[element]]
id = "lib"
version = "1.0"

[[element]]
id = "lib"
version = "2.5"
dependencies = [{ id = "core" }]

[[element]]
id = "core"
version = "1.0"
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn load_system_adds_every_element() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);

    let loaded = load_system(&path, None).unwrap();
    assert_eq!(loaded.universe.elements.len(), 4);
    assert_eq!(loaded.system.len(), 4);
    assert!(loaded.config.produce_delta);
}

#[test]
fn config_file_overrides_resolver_table() {
    let dir = TempDir::new().unwrap();
    let universe = format!("[resolver]\npolicy = \"all-satisfied\"\n{UNIVERSE}");
    let path = write(&dir, "universe.toml", &universe);
    let config = write(&dir, "resolver.toml", "policy = \"highest\"\n");

    let mut loaded = load_system(&path, Some(&config)).unwrap();
    loaded.system.resolve().unwrap();
    let lib = loaded.system.element_set("lib").unwrap();
    assert_eq!(lib.resolved().len(), 1);
    assert_eq!(lib.resolved()[0].version(), "2.5");
}

#[test]
fn missing_universe_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = load_system(&dir.path().join("nope.toml"), None).unwrap_err();
    assert!(err.to_string().contains("Universe error"));
}

#[test]
fn resolve_lists_elements_and_delta() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);

    let out = ops_resolve::render(&path, &ResolveOptions::default()).unwrap();
    assert!(out.starts_with("app@1.0\ncore@1.0\nlib@1.0\nlib@2.5\n"));
    assert!(out.contains("Changes (4):"));
    assert!(out.contains("  app@1.0: UNKNOWN -> RESOLVED"));
}

#[test]
fn resolve_without_delta() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);
    let opts = ResolveOptions {
        no_delta: true,
        ..Default::default()
    };

    let out = ops_resolve::render(&path, &opts).unwrap();
    assert!(out.contains("lib@2.5"));
    assert!(!out.contains("Changes"));
}

#[test]
fn resolve_json_shape() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);
    let opts = ResolveOptions {
        json: true,
        ..Default::default()
    };

    let out = ops_resolve::render(&path, &opts).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["resolved"].as_array().unwrap().len(), 4);
    assert_eq!(json["resolved"][0]["id"], "app");
    assert_eq!(json["delta"][0]["to"], "RESOLVED");
}

#[test]
fn resolve_reports_cycles() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "cycle.toml",
        r#"
[[element]]
id = "a"
version = "1"
dependencies = [{ id = "b" }]

[[element]]
id = "b"
version = "1"
dependencies = [{ id = "a" }]
"#,
    );
    let err = ops_resolve::render(&path, &ResolveOptions::default()).unwrap_err();
    assert!(err.to_string().contains("a -> b -> a"));
}

#[test]
fn status_explains_unresolved_elements() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "universe.toml",
        r#"
[[element]]
id = "app"
version = "1.0"
dependencies = [{ id = "lib", version = "3.0" }]

[[element]]
id = "lib"
version = "2.0"
"#,
    );

    let out = ops_status::render(&path).unwrap();
    assert!(out.contains("  ! app@1.0: no satisfied match for lib compatible 3.0"));
    assert!(out.contains("  resolved   2.0"));
}

#[test]
fn tree_renders_resolved_edges() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);

    let out = ops_tree::render(&path, &TreeOptions::default()).unwrap();
    assert!(out.contains("app@1.0\n└── lib@2.5\n    └── core@1.0\n"));
    assert!(out.contains("lib@1.0\n"));
}

#[test]
fn tree_why_shows_path() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);
    let opts = TreeOptions {
        why: Some("core".into()),
        ..Default::default()
    };

    let out = ops_tree::render(&path, &opts).unwrap();
    assert_eq!(out, "Path to core:\napp@1.0\n  lib@2.5\n    core@1.0\n");
}

#[test]
fn tree_why_unknown_identity() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "universe.toml", UNIVERSE);
    let opts = TreeOptions {
        why: Some("ghost".into()),
        ..Default::default()
    };
    let out = ops_tree::render(&path, &opts).unwrap();
    assert_eq!(out, "'ghost' is not resolved.\n");
}

#[test]
fn diff_reports_incremental_changes() {
    let dir = TempDir::new().unwrap();
    let old = write(&dir, "old.toml", UNIVERSE);
    let new = write(
        &dir,
        "new.toml",
        &UNIVERSE.replace("version = \"2.5\"", "version = \"2.7\""),
    );

    let delta = ops_diff::run(&old, &new).unwrap();
    let removed = delta.get("lib", "2.5").unwrap();
    assert_eq!(removed.old_status(), ElementStatus::Resolved);
    assert_eq!(removed.new_status(), ElementStatus::Unknown);
    let added = delta.get("lib", "2.7").unwrap();
    assert_eq!(added.new_status(), ElementStatus::Resolved);
    assert!(delta.get("app", "1.0").unwrap().is_dependency_only());
    assert!(delta.get("core", "1.0").is_none());
}

#[test]
fn diff_reports_dependency_move_of_edited_element() {
    let dir = TempDir::new().unwrap();
    let old = write(&dir, "old.toml", UNIVERSE);
    let new = write(
        &dir,
        "new.toml",
        &UNIVERSE.replace(
            r#"{ id = "lib", version = "2.0", match = ">=" }"#,
            r#"{ id = "lib", version = "1.0", match = "perfect" }"#,
        ),
    );

    let out = ops_diff::render(&old, &new).unwrap();
    assert_eq!(out, "Changes (1):\n  app@1.0: DEPENDENCY\n");
}

#[test]
fn diff_of_identical_universes_is_empty() {
    let dir = TempDir::new().unwrap();
    let old = write(&dir, "old.toml", UNIVERSE);
    let new = write(&dir, "new.toml", UNIVERSE);

    assert_eq!(ops_diff::render(&old, &new).unwrap(), "No changes.\n");
}
