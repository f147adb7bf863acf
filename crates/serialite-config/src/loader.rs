// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered loading of [`SerialiteConfig`] with figment.
//!
//! Supports the XDG hierarchy (`./serialite.toml`, then
//! `~/.config/serialite/serialite.toml`, then `/etc/serialite/serialite.toml`)
//! with environment variable overrides via the `SERIALITE_` prefix.

// figment::Error is large and not ours to box.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SerialiteConfig;

/// Loads every configuration layer.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/serialite/serialite.toml` (system-wide)
/// 3. `~/.config/serialite/serialite.toml` (user XDG config)
/// 4. `./serialite.toml` (local directory)
/// 5. `SERIALITE_*` environment variables
pub fn load_config() -> Result<SerialiteConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SerialiteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SerialiteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads defaults, then the file at `path`, then environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<SerialiteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SerialiteConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Candidate configuration files, lowest precedence first. Missing files are
/// skipped when merging.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/serialite/serialite.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("serialite").join("serialite.toml"));
    }
    paths.push(PathBuf::from("serialite.toml"));
    paths
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(SerialiteConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SERIALITE_WORKER_THREAD_NAME` must map to
/// `worker.thread_name`, not `worker.thread.name`.
fn env_provider() -> Env {
    Env::prefixed("SERIALITE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("worker_", "worker.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
