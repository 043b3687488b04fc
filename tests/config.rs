//! Config discovery and parsing tests.

use std::collections::HashMap;

use unity_clippy::config::{self, DEFAULT_CONFIG_FILE_NAME};
use unity_clippy::level::LintLevel;

#[test]
fn parses_lints_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"
[lints]
disabled = ["on_gui_usage"]
preview = true
should_cache_delegate = "error"
"#,
    )
    .expect("write config");

    let cfg = config::load_config_file(&path).expect("config should parse");
    assert_eq!(cfg.lints.disabled, vec!["on_gui_usage".to_string()]);
    assert!(cfg.lints.preview);
    assert_eq!(
        cfg.lints.levels,
        HashMap::from([("should_cache_delegate".to_string(), LintLevel::Error)])
    );
}

#[test]
fn empty_config_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
    std::fs::write(&path, "").expect("write config");

    let cfg = config::load_config_file(&path).expect("config should parse");
    assert!(cfg.lints.disabled.is_empty());
    assert!(!cfg.lints.preview);
    assert!(cfg.lints.levels.is_empty());
}

#[test]
fn config_is_found_upward_from_nested_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    std::fs::write(root.join(DEFAULT_CONFIG_FILE_NAME), "[lints]\n").expect("write config");

    let nested = root.join("Assets").join("Scripts");
    std::fs::create_dir_all(&nested).expect("create nested dirs");

    let found = config::find_config_file(&nested).expect("config should be found");
    assert_eq!(found, root.join(DEFAULT_CONFIG_FILE_NAME));
}

#[test]
fn explicit_path_wins_over_discovery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    std::fs::write(
        root.join(DEFAULT_CONFIG_FILE_NAME),
        "[lints]\npreview = false\n",
    )
    .expect("write discovered config");

    let explicit = root.join("other.toml");
    std::fs::write(&explicit, "[lints]\npreview = true\n").expect("write explicit config");

    let loaded = config::load_config(Some(&explicit), root)
        .expect("load should succeed")
        .expect("explicit config should load");
    assert_eq!(loaded.0, explicit);
    assert!(loaded.1.lints.preview);
}

#[test]
fn missing_config_is_not_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = config::load_config(None, dir.path()).expect("load should succeed");
    assert!(loaded.is_none());
}

#[test]
fn invalid_toml_reports_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
    std::fs::write(&path, "[lints\n").expect("write config");

    let err = config::load_config_file(&path).expect_err("parse should fail");
    assert!(format!("{err:#}").contains(DEFAULT_CONFIG_FILE_NAME));
}
