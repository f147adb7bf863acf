// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the serialite configuration system.

use std::path::Path;

use figment::Jail;
use serialite_config::diagnostic::ConfigError;
use serialite_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use serialite_core::RestartPolicy;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_serialite_config() {
    let toml = r#"
[worker]
thread_name = "db-writer"
restart_policy = "terminal"

[storage]
database_path = "/tmp/test.db"
wal_mode = false
busy_timeout_ms = 250
foreign_keys = false

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.worker.thread_name, "db-writer");
    assert_eq!(config.worker.restart_policy, RestartPolicy::Terminal);
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.busy_timeout_ms, 250);
    assert!(!config.storage.foreign_keys);
    assert_eq!(config.logging.level, "debug");
}

/// Empty TOML falls back to compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.worker.thread_name, "serialite-consumer");
    assert_eq!(config.worker.restart_policy, RestartPolicy::Restart);
    assert_eq!(config.storage.database_path, "serialite.db");
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.busy_timeout_ms, 5_000);
    assert_eq!(config.logging.level, "info");
}

/// Unknown field in [worker] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_in_worker_suggests_correction() {
    let toml = r#"
[worker]
thread_nmae = "x"
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "thread_nmae");
            assert_eq!(suggestion.as_deref(), Some("thread_name"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[pool]
size = 4
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown section");
    assert!(err.to_string().contains("pool"), "got: {err}");
}

/// Wrong value type produces InvalidType.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[storage]
busy_timeout_ms = "soon"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("busy_timeout_ms"))),
        "got: {errors:?}"
    );
}

/// A restart policy outside the enum is reported as an invalid value.
#[test]
fn unknown_restart_policy_is_rejected() {
    let toml = r#"
[worker]
restart_policy = "sometimes"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidValue { .. } | ConfigError::Other(_))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_from_str_loader() {
    let toml = r#"
[logging]
level = "verbose"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("logging.level")));
}

/// File values are overridden by SERIALITE_* environment variables.
#[test]
fn env_overrides_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "serialite.toml",
            r#"
[worker]
thread_name = "from-file"

[storage]
database_path = "file.db"
"#,
        )?;
        jail.set_env("SERIALITE_WORKER_THREAD_NAME", "from-env");
        jail.set_env("SERIALITE_WORKER_RESTART_POLICY", "terminal");
        jail.set_env("SERIALITE_STORAGE_BUSY_TIMEOUT_MS", "42");

        let config = load_config_from_path(Path::new("serialite.toml"))?;
        assert_eq!(config.worker.thread_name, "from-env");
        assert_eq!(config.worker.restart_policy, RestartPolicy::Terminal);
        assert_eq!(config.storage.database_path, "file.db");
        assert_eq!(config.storage.busy_timeout_ms, 42);
        Ok(())
    });
}
