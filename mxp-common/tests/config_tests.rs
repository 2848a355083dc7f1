//! Unit tests for configuration and graceful degradation
//!
//! Tests cover:
//! - Missing TOML files fall back to compiled defaults
//! - Priority order for root folder resolution (CLI → ENV → TOML → default)
//! - Root folder layout creation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate MXP_ROOT_FOLDER or MXP_ROOT are marked with #[serial].

use mxp_common::config::{
    load_toml_config, write_toml_config, CompiledDefaults, ExportConfig, LoggingConfig,
    RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_root_env() {
    env::remove_var("MXP_ROOT_FOLDER");
    env::remove_var("MXP_ROOT");
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.root_folder.to_string_lossy().contains("mxp"));
}

#[test]
fn test_missing_toml_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_toml_config(&temp_dir.path().join("absent.toml"))
        .expect("Missing config must not be an error");

    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.export.worker_count, 4);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_partial_toml_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mxp-ex.toml");
    std::fs::write(
        &path,
        r#"
port = 6000

[export]
worker_count = 8
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.export.worker_count, 8);
    assert_eq!(config.export.max_concurrent_jobs, 2);
    assert_eq!(config.export.max_queued_jobs, 16);
    assert_eq!(config.export.page_size, 100);
    assert!(config.root_folder.is_none());
}

#[test]
fn test_invalid_toml_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_write_then_load_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sub").join("mxp-ex.toml");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/srv/mxp")),
        port: Some(5999),
        snapshot_path: Some(PathBuf::from("/srv/mxp/library.json")),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        export: ExportConfig {
            worker_count: 2,
            ..ExportConfig::default()
        },
    };

    write_toml_config(&config, &path).unwrap();
    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(
        root_folder,
        CompiledDefaults::for_current_platform().root_folder
    );
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    clear_root_env();
    env::set_var("MXP_ROOT_FOLDER", "/tmp/mxp-env");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/mxp-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/mxp-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    clear_root_env();
    env::set_var("MXP_ROOT", "/tmp/mxp-short-env");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/mxp-toml")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/mxp-short-env"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_primary_env_beats_short_env() {
    clear_root_env();
    env::set_var("MXP_ROOT_FOLDER", "/tmp/mxp-primary");
    env::set_var("MXP_ROOT", "/tmp/mxp-short");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/mxp-primary"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    clear_root_env();

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/mxp-toml")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/mxp-toml"));
}

#[test]
fn test_initializer_creates_layout() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert!(initializer.export_dir().is_dir());
    assert_eq!(initializer.database_path(), root.join("mxp.db"));
}
