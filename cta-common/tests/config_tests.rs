//! Configuration resolution tests
//!
//! Covers the CLI > environment > TOML > defaults priority order and the
//! missing-file fallback.
//!
//! Note: Uses serial_test because these tests set CTA_CONFIG and
//! CTA_SERVER_URL; tests touching them are marked #[serial].

use cta_common::config::{
    resolve_config_path, ClientConfig, ConfigOverrides, CONFIG_PATH_ENV, SERVER_URL_ENV,
};
use cta_common::{Error, LayoutChoice};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn clear_env() {
    env::remove_var(CONFIG_PATH_ENV);
    env::remove_var(SERVER_URL_ENV);
}

#[test]
#[serial]
fn test_cli_path_takes_precedence_over_env() {
    clear_env();
    env::set_var(CONFIG_PATH_ENV, "/tmp/cta-from-env.toml");

    let path = resolve_config_path(Some(PathBuf::from("/tmp/cta-from-cli.toml").as_path()));
    assert_eq!(path, Some(PathBuf::from("/tmp/cta-from-cli.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    clear_env();
    env::set_var(CONFIG_PATH_ENV, "/tmp/cta-from-env.toml");

    assert_eq!(
        resolve_config_path(None),
        Some(PathBuf::from("/tmp/cta-from-env.toml"))
    );

    clear_env();
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = ClientConfig::resolve(ConfigOverrides {
        config_path: Some(missing),
        server_url: None,
    })
    .unwrap();

    assert_eq!(config, ClientConfig::default());
}

#[test]
#[serial]
fn test_toml_values_loaded() {
    clear_env();
    let file = write_toml(
        r#"
        server_url = "http://analysis.local:8080"
        default_layout = "obverse_reverse"
        event_capacity = 16

        [retry]
        max_attempts = 4
        attempt_timeout_ms = 5000
        retry_delay_ms = 250

        [logging]
        level = "debug"
        "#,
    );

    let config = ClientConfig::resolve(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        server_url: None,
    })
    .unwrap();

    assert_eq!(config.server_url, "http://analysis.local:8080");
    assert_eq!(config.default_layout, LayoutChoice::ObverseReverse);
    assert_eq!(config.event_capacity, 16);
    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.retry.attempt_timeout_ms, 5000);
    assert_eq!(config.retry.retry_delay_ms, 250);
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_env_server_url_overrides_toml() {
    clear_env();
    let file = write_toml("server_url = \"http://from-toml:5000\"");
    env::set_var(SERVER_URL_ENV, "http://from-env:5000");

    let config = ClientConfig::resolve(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        server_url: None,
    })
    .unwrap();
    assert_eq!(config.server_url, "http://from-env:5000");

    clear_env();
}

#[test]
#[serial]
fn test_cli_server_url_overrides_env() {
    clear_env();
    let file = write_toml("server_url = \"http://from-toml:5000\"");
    env::set_var(SERVER_URL_ENV, "http://from-env:5000");

    let config = ClientConfig::resolve(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        server_url: Some("http://from-cli:5000".to_string()),
    })
    .unwrap();
    assert_eq!(config.server_url, "http://from-cli:5000");

    clear_env();
}

#[test]
#[serial]
fn test_unparsable_file_is_config_error() {
    clear_env();
    let file = write_toml("server_url = [not toml");

    let err = ClientConfig::resolve(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        server_url: None,
    })
    .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}
