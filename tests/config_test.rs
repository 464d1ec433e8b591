//! Tests for layered settings loading

use std::fs;
use std::path::{Path, PathBuf};

use config::Map;
use tempfile::TempDir;

use cce_tree::application::{ApplicationError, ApplicationResult};
use cce_tree::config::Settings;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Loads with no global file and an empty environment.
fn load_isolated(config_file: &Path) -> ApplicationResult<Settings> {
    Settings::load_layers(None, Some(config_file), Some(Map::new()))
}

#[test]
fn given_config_file_when_loading_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "cce-tree.toml",
        r#"
[tree]
branching_factor = 4

[arena]
max_blocks = 8
"#,
    );

    let settings = load_isolated(&path).unwrap();

    assert_eq!(settings.tree.branching_factor, 4);
    assert_eq!(settings.tree.depth, 3);
    assert_eq!(settings.arena.max_blocks, Some(8));
}

#[test]
fn given_missing_config_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let result = load_isolated(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_malformed_config_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "cce-tree.toml", "[tree\nbranching_factor = ");

    let err = load_isolated(&path).unwrap_err();

    assert!(err.to_string().contains("parse"));
}

#[test]
fn given_invalid_values_in_file_when_loading_then_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "cce-tree.toml", "[tree]\nbranching_factor = 0\n");

    assert!(load_isolated(&path).is_err());
}

#[test]
fn given_global_and_explicit_files_when_loading_then_explicit_wins() {
    let dir = TempDir::new().unwrap();
    let global = write_config(
        &dir,
        "global.toml",
        "[tree]\nbranching_factor = 5\ndepth = 6\n",
    );
    let local = write_config(&dir, "local.toml", "[tree]\ndepth = 2\n");

    let settings = Settings::load_layers(Some(&global), Some(&local), Some(Map::new())).unwrap();

    assert_eq!(settings.tree.branching_factor, 5);
    assert_eq!(settings.tree.depth, 2);
}

#[test]
fn given_absent_global_file_when_loading_then_skipped() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("missing.toml");

    let settings = Settings::load_layers(Some(&global), None, Some(Map::new())).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_env_source_when_loading_after_file_then_env_wins() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "cce-tree.toml", "[tree]\ndepth = 5\n");

    let mut env = Map::new();
    env.insert("CCETREE_TREE__DEPTH".to_string(), "7".to_string());
    env.insert("CCETREE_ARENA__BLOCK_NODES".to_string(), "16".to_string());
    let settings = Settings::load_layers(None, Some(&path), Some(env)).unwrap();

    assert_eq!(settings.tree.depth, 7);
    assert_eq!(settings.arena.block_nodes, 16);
}

#[test]
fn given_non_numeric_env_value_when_loading_then_config_error() {
    let mut env = Map::new();
    env.insert(
        "CCETREE_TREE__BRANCHING_FACTOR".to_string(),
        "abc".to_string(),
    );

    let result = Settings::load_layers(None, None, Some(env));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}
