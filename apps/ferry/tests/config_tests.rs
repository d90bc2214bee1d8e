//! Configuration loading tests.

use ferry::config::{DEFAULT_CONFIG_FILE, FerryConfig};
use ferry_core::{FerryError, Policy, RejectStructs};
use std::path::PathBuf;

#[test]
fn empty_file_gives_defaults() {
    let config = FerryConfig::parse("").expect("parse");
    assert_eq!(config, FerryConfig::default());
    assert!(config.traversal.follow_includes);
    assert!(config.policy.resolve_structs);
}

#[test]
fn sections_are_read() {
    let config = FerryConfig::parse(
        r#"
[parser]
include_dirs = ["include", "third_party"]

[traversal]
follow_includes = false
exclude_patterns = ["/usr/"]

[policy]
accepted_types = ["int"]
resolve_structs = false
"#,
    )
    .expect("parse");

    assert_eq!(
        config.parser.include_dirs,
        vec![PathBuf::from("include"), PathBuf::from("third_party")]
    );
    let options = config.aggregator_options();
    assert!(!options.follow_includes);
    assert_eq!(options.exclude_patterns, vec!["/usr/"]);
    assert!(options.include_patterns.is_empty());

    let policy = config.policy();
    assert!(policy.accept("const int &", &mut RejectStructs));
    assert!(policy.accept("std::int32_t", &mut RejectStructs));
    assert!(!policy.accept("Point", &mut RejectStructs));
}

#[test]
fn unknown_section_is_rejected() {
    assert!(FerryConfig::parse("[server]\nport = 1\n").is_err());
}

#[test]
fn default_file_is_optional() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = FerryConfig::load(None, dir.path()).expect("load");
    assert_eq!(config, FerryConfig::default());
}

#[test]
fn default_file_is_picked_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join(DEFAULT_CONFIG_FILE),
        "[traversal]\nfollow_includes = false\n",
    )
    .expect("write");

    let config = FerryConfig::load(None, dir.path()).expect("load");
    assert!(!config.traversal.follow_includes);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    let error = FerryConfig::load(Some(&missing), dir.path()).err().expect("error");
    assert!(matches!(error, FerryError::Config(_)));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[policy\nresolve_structs = ").expect("write");
    let error = FerryConfig::load(Some(&path), dir.path()).err().expect("error");
    assert!(matches!(error, FerryError::Config(_)));
}
