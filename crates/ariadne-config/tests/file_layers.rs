//! Loading configuration from files on disk.

use std::io::Write;

use ariadne_config::{ConfigError, ConfigLoader, SinkKind};
use tempfile::{Builder, NamedTempFile};

fn file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn toml_file_overrides_defaults() {
    let file = file_with(
        ".toml",
        r#"
            [service]
            name = "orders"
            version = "2.3.0"

            [logging]
            level = "debug"
            sink = "stderr"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.service.name, "orders");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.sink, SinkKind::Stderr);
    assert!(config.ingress.trust_incoming_ids);
}

#[test]
fn json_file_is_supported() {
    let file = file_with(".json", r#"{"ingress": {"require_access_token": false}}"#);

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert!(!config.ingress.require_access_token);
}

#[test]
fn unknown_field_in_file_is_rejected() {
    let file = file_with(".toml", "[logging]\nformat = \"pretty\"\n");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::TomlError(_)));
}

#[test]
fn unsupported_extension_is_rejected() {
    let file = file_with(".yaml", "service: {}\n");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn env_overrides_apply_after_the_file() {
    let file = file_with(".toml", "[logging]\nlevel = \"debug\"\n");

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_vars("SVC", [("SVC__LOGGING__LEVEL", "warn")])
        .load()
        .unwrap();

    assert_eq!(config.logging.level, "warn");
}

#[test]
fn invalid_value_in_file_fails_validation() {
    let file = file_with(".toml", "[service]\nname = \"\"\n");

    let err = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn missing_dotenv_file_is_reported() {
    let err = ConfigLoader::new()
        .with_dotenv_file("/nonexistent/.env")
        .unwrap_err();

    assert!(matches!(err, ConfigError::ReadError { .. }));
}
