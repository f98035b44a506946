use depsys_core::config::PolicyKind;
use depsys_core::universe::Universe;

const SAMPLE: &str = r#"
[resolver]
policy = "highest"

[[element]]
id = "app"
version = "1.0"
singleton = true
dependencies = [
  { id = "lib", version = "2.0", match = ">=" },
  { id = "log", optional = true },
]

[[element]]
id = "lib"
version = "2.1"
"#;

#[test]
fn parse_sample_universe() {
    let universe = Universe::parse_toml(SAMPLE).unwrap();
    assert_eq!(universe.elements.len(), 2);
    assert_eq!(universe.resolver_config().policy, PolicyKind::Highest);

    let app = universe.find("app@1.0").unwrap();
    assert!(app.singleton);
    assert_eq!(app.dependencies.len(), 2);
    assert!(app.dependencies[1].optional);
}

#[test]
fn build_elements() {
    let universe = Universe::parse_toml(SAMPLE).unwrap();
    let elements = universe.elements().unwrap();
    assert_eq!(elements[0].to_string(), "app@1.0");
    assert!(elements[0].is_singleton());
    let deps = elements[0].dependencies();
    assert_eq!(deps[0].match_rule().name(), "greater-or-equal");
    assert_eq!(deps[1].match_rule().name(), "any");
    assert!(deps[1].is_optional());
}

#[test]
fn missing_resolver_table_uses_defaults() {
    let universe = Universe::parse_toml("").unwrap();
    assert!(universe.elements.is_empty());
    assert_eq!(universe.resolver_config().policy, PolicyKind::AllSatisfied);
}

#[test]
fn duplicate_element_rejected() {
    let err = Universe::parse_toml(
        r#"
[[element]]
id = "a"
version = "1"

[[element]]
id = "a"
version = "1"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate element a@1"), "got: {err}");
}

#[test]
fn unknown_match_rule_rejected() {
    let err = Universe::parse_toml(
        r#"
[[element]]
id = "a"
version = "1"
dependencies = [{ id = "b", version = "1", match = "newest" }]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown match rule 'newest'"), "got: {err}");
}

#[test]
fn malformed_toml_is_universe_error() {
    let err = Universe::parse_toml("[[element]\nid = ").unwrap_err();
    assert!(err.to_string().starts_with("Universe error"), "got: {err}");
}

#[test]
fn load_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("universe.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    let universe = Universe::from_path(&path).unwrap();
    assert!(universe.find("lib@2.1").is_some());
}

#[test]
fn load_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Universe::from_path(&dir.path().join("nope.toml")).is_err());
}
