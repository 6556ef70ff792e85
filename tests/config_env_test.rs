//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use pm_mindmap::config::{Config, LogFormat};
use pm_mindmap::validation::Policy;
use pm_mindmap::AppError;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_vars() {
    for var in [
        "HIERARCHY_DEPTH_LIMIT",
        "VALIDATION_POLICY",
        "SEED_PATH",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_vars();

    let config = Config::from_env().unwrap();
    assert_eq!(config.hierarchy.depth_limit, 4);
    assert_eq!(config.validation.default_policy, Policy::Warn);
    assert_eq!(config.seed.path, PathBuf::from("./data/seed.json"));
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_config_from_env_custom_depth_limit() {
    clear_vars();
    env::set_var("HIERARCHY_DEPTH_LIMIT", "6");

    let config = Config::from_env().unwrap();
    assert_eq!(config.hierarchy.depth_limit, 6);

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_invalid_depth_limit() {
    clear_vars();

    for raw in ["0", "deep", "-1"] {
        env::set_var("HIERARCHY_DEPTH_LIMIT", raw);
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config { .. }), "accepted {raw:?}");
    }

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_block_policy() {
    clear_vars();
    env::set_var("VALIDATION_POLICY", "block");

    let config = Config::from_env().unwrap();
    assert_eq!(config.validation.default_policy, Policy::Block);

    env::set_var("VALIDATION_POLICY", "strict");
    assert!(Config::from_env().is_err());

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_seed_path() {
    clear_vars();
    env::set_var("SEED_PATH", "/tmp/custom-seed.json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.seed.path, PathBuf::from("/tmp/custom-seed.json"));

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    clear_vars();
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");

    env::set_var("LOG_FORMAT", "something-else");
    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);

    clear_vars();
}
