//! Integration tests for document persistence.
//!
//! These tests verify that a tree survives save → load → save unchanged in
//! both formats, and that `FileConfig` behaves correctly against a real
//! directory on disk.

use std::fs;
use std::path::PathBuf;

use anura_config::infrastructure::document::{load, save};
use anura_config::{ConfigTree, DocumentFormat, FileConfig, LoadError, Scalars};
use uuid::Uuid;

/// Creates a unique scratch directory below the system temp dir.
fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("anura-config-it-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("temp dir must be creatable");
    dir
}

fn sample_tree() -> ConfigTree {
    let mut tree = ConfigTree::new();
    tree.set("discord.token", "Nz.abc:def#ghi").unwrap();
    tree.set("discord.guild", 123456789012345678i64).unwrap();
    tree.set("sql.host", "localhost").unwrap();
    tree.set("sql.port", 3306).unwrap();
    tree.set("sql.ssl", false).unwrap();
    tree.set("sql.pool.size", 8).unwrap();
    tree.set("motd", "Welcome!\nSecond line").unwrap();
    tree.set("zip", "01234").unwrap();
    tree.set("ratio", 0.25).unwrap();
    tree.set("empty", "").unwrap();
    tree
}

fn save_tree(tree: &ConfigTree, format: DocumentFormat) -> String {
    let root = tree.section(tree.root()).expect("root is always live");
    save(root, format).expect("save must succeed")
}

fn reload(text: &str, format: DocumentFormat) -> ConfigTree {
    let mut tree = ConfigTree::new();
    tree.set_all(load(text, format).expect("load must succeed"));
    tree
}

// ── Round trips ───────────────────────────────────────────────────────────────

#[test]
fn test_yaml_save_load_save_is_stable() {
    let tree = sample_tree();

    let first = save_tree(&tree, DocumentFormat::Yaml);
    let second = save_tree(&reload(&first, DocumentFormat::Yaml), DocumentFormat::Yaml);

    assert_eq!(first, second);
}

#[test]
fn test_toml_save_load_save_is_stable() {
    let tree = sample_tree();

    let first = save_tree(&tree, DocumentFormat::Toml);
    let second = save_tree(&reload(&first, DocumentFormat::Toml), DocumentFormat::Toml);

    assert_eq!(first, second);
}

#[test]
fn test_yaml_round_trip_preserves_every_value() {
    let tree = sample_tree();
    let reloaded = reload(&save_tree(&tree, DocumentFormat::Yaml), DocumentFormat::Yaml);
    assert_eq!(reloaded.get_map(true), tree.get_map(true));
}

#[test]
fn test_toml_round_trip_preserves_every_value() {
    let tree = sample_tree();
    let reloaded = reload(&save_tree(&tree, DocumentFormat::Toml), DocumentFormat::Toml);
    assert_eq!(reloaded.get_map(true), tree.get_map(true));
}

#[test]
fn test_saved_yaml_is_sorted_by_path() {
    let mut tree = ConfigTree::new();
    tree.set("b.y", 2).unwrap();
    tree.set("a", 1).unwrap();
    tree.set("b.x", 1).unwrap();

    assert_eq!(
        save_tree(&tree, DocumentFormat::Yaml),
        "a: 1\nb:\n  x: 1\n  y: 2\n"
    );
}

// ── FileConfig on disk ────────────────────────────────────────────────────────

#[test]
fn test_open_missing_file_creates_it_empty() {
    // Arrange
    let dir = scratch_dir();
    let path = dir.join("config.yml");

    // Act
    let config = FileConfig::open(&path).unwrap();

    // Assert
    assert!(path.exists());
    assert!(config.get_keys(true).is_empty());
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_open_save_reopen_keeps_values() {
    // Arrange
    let dir = scratch_dir();
    let path = dir.join("config.yml");
    let mut config = FileConfig::open(&path).unwrap();
    config.set("sql.port", 3306).unwrap();
    config.set("discord.token", "abc").unwrap();

    // Act
    config.save().unwrap();
    let reopened = FileConfig::open(&path).unwrap();

    // Assert
    assert_eq!(reopened.get_i32("sql.port"), 3306);
    assert_eq!(reopened.get_string("discord.token"), Some("abc"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_open_toml_file_uses_toml_format() {
    let dir = scratch_dir();
    let path = dir.join("config.toml");
    fs::write(&path, "[sql]\nport = 3306\n").unwrap();

    let config = FileConfig::open(&path).unwrap();

    assert_eq!(config.format(), DocumentFormat::Toml);
    assert_eq!(config.get_i32("sql.port"), 3306);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_open_malformed_file_is_load_error() {
    let dir = scratch_dir();
    let path = dir.join("config.yml");
    fs::write(&path, "sql: [unclosed\n").unwrap();

    let result = FileConfig::open(&path);

    assert!(matches!(result, Err(LoadError::Yaml(_))));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_defaults_then_save_writes_merged_document() {
    // Arrange
    let dir = scratch_dir();
    let path = dir.join("config.yml");
    fs::write(&path, "sql:\n  port: 3307\n").unwrap();
    let mut config = FileConfig::open(&path).unwrap();

    // Act
    config.load_defaults("sql:\n  host: localhost\n  port: 3306\n");
    config.save().unwrap();

    // Assert
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "sql:\n  host: localhost\n  port: 3307\n"
    );
    let _ = fs::remove_dir_all(dir);
}
