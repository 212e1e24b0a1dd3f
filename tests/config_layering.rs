//! Layered config loading against real files.

use std::fs;
use std::path::{Path, PathBuf};

use auth_service::config::{load_config, AuthServiceConfig, ConfigError, ValidationError};
use tempfile::TempDir;

const BASE: &str = r#"
[server]
port = 50051
host = "0.0.0.0"

[jwt]
secret_key = "base-secret"

[logging]
level = "info"

[database]
host = "localhost"
port = 5432
user = "auth"
password = "base-password"
db_name = "auth"
"#;

fn config_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

#[test]
fn test_overlay_overrides_only_its_keys() {
    let dir = config_dir(&[
        ("base.toml", BASE),
        ("staging.toml", "[database]\nhost = \"db.staging\"\n\n[logging]\nlevel = \"warn\"\n"),
    ]);

    let config: AuthServiceConfig = load_config(dir.path(), "staging").unwrap();

    assert_eq!(config.database.host, "db.staging");
    assert_eq!(config.database.user, "auth");
    assert_eq!(config.database.password, "base-password");
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.server.port, 50051);
    assert_eq!(config.jwt.secret_key, "base-secret");
}

#[test]
fn test_missing_overlay_uses_base() {
    let dir = config_dir(&[("base.toml", BASE)]);

    let config: AuthServiceConfig = load_config(dir.path(), "nonexistent").unwrap();
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.server.shutdown_timeout_secs, 10);
}

#[test]
fn test_malformed_overlay_is_an_error() {
    let dir = config_dir(&[("base.toml", BASE), ("broken.toml", "[database\nhost = ")]);

    let err = load_config::<AuthServiceConfig>(dir.path(), "broken").unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => assert!(path.ends_with("broken.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_base_is_an_error() {
    let dir = config_dir(&[("development.toml", "[logging]\nlevel = \"debug\"\n")]);

    let err = load_config::<AuthServiceConfig>(dir.path(), "development").unwrap_err();
    assert!(matches!(err, ConfigError::MissingBase { source: None, .. }), "got {err}");
}

#[test]
fn test_malformed_base_counts_as_missing() {
    let dir = config_dir(&[("base.toml", "[server\nport = ")]);

    let err = load_config::<AuthServiceConfig>(dir.path(), "development").unwrap_err();
    match err {
        ConfigError::MissingBase { path, source } => {
            assert!(path.ends_with("base.toml"));
            assert!(source.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_directory_is_rejected() {
    let err = load_config::<AuthServiceConfig>(Path::new(""), "development").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyDirectory));
}

#[test]
fn test_all_missing_fields_reported_together() {
    let dir = config_dir(&[("base.toml", "[server]\nport = 8080\n")]);

    let err = load_config::<AuthServiceConfig>(dir.path(), "development").unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation failure, got {err}");
    };
    assert!(errors.contains(&ValidationError::Missing("database.host")));
    assert!(errors.contains(&ValidationError::Missing("database.user")));
    assert!(errors.contains(&ValidationError::Missing("database.db_name")));
    assert!(!errors.contains(&ValidationError::Missing("server.port")));
}

#[test]
fn test_wrong_type_fails_decode() {
    let dir = config_dir(&[("base.toml", BASE), ("development.toml", "[server]\nport = \"eighty\"\n")]);

    let err = load_config::<AuthServiceConfig>(dir.path(), "development").unwrap_err();
    assert!(matches!(err, ConfigError::Decode(_)), "got {err}");
}

fn shipped_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config")
}

#[test]
fn test_shipped_configs_load() {
    let development: AuthServiceConfig = load_config(&shipped_config(), "development").unwrap();
    assert_eq!(development.log.level, "debug");
    assert_eq!(development.server.port, 50051);

    let production: AuthServiceConfig = load_config(&shipped_config(), "production").unwrap();
    assert_eq!(production.database.ssl_mode, "require");
    assert_eq!(production.database.host, "postgres");
    assert_eq!(production.database.user, "auth");
}
