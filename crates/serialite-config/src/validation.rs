// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checks that need more than deserialization: ranges, emptiness, and
//! level names.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::SerialiteConfig;

/// Upper bound for `storage.busy_timeout_ms` (ten minutes).
const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;

/// Log levels accepted by `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Runs every check and reports all failures together.
pub fn validate_config(config: &SerialiteConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let thread_name = &config.worker.thread_name;
    if thread_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "worker.thread_name must not be empty".to_string(),
        });
    }
    // std::thread::Builder::name panics on interior NUL bytes.
    if thread_name.contains('\0') {
        errors.push(ConfigError::Validation {
            message: "worker.thread_name must not contain NUL bytes".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}, got {}",
                config.storage.busy_timeout_ms
            ),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
