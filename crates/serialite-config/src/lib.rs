// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for serialite.
//!
//! Settings come from compiled defaults, then `serialite.toml` files
//! (system, user, working directory), then `SERIALITE_*` environment
//! variables. Unknown keys are rejected, and every problem is reported as a
//! miette diagnostic rather than stopping at the first.
//!
//! # Usage
//!
//! ```no_run
//! use serialite_config::load_and_validate;
//!
//! let config = match load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         serialite_config::render_errors(&errors);
//!         std::process::exit(2);
//!     }
//! };
//! println!("consumer thread: {}", config.worker.thread_name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, suggest_key, ConfigError};
pub use loader::{config_paths, load_config, load_config_from_path, load_config_from_str};
pub use model::{LoggingConfig, SerialiteConfig, StorageConfig, WorkerConfig};

/// Loads the layered configuration and validates it.
///
/// When figment rejects a file, the candidate files are read again so each
/// diagnostic can quote the offending line.
pub fn load_and_validate() -> Result<SerialiteConfig, Vec<ConfigError>> {
    let config = loader::load_config()
        .map_err(|err| diagnostic::figment_to_config_errors(err, &read_sources()))?;
    validation::validate_config(&config)?;
    tracing::debug!(
        thread_name = %config.worker.thread_name,
        database_path = %config.storage.database_path,
        "configuration loaded"
    );
    Ok(config)
}

/// Parses `toml_content` over the defaults, without files or environment,
/// and validates the result.
pub fn load_and_validate_str(toml_content: &str) -> Result<SerialiteConfig, Vec<ConfigError>> {
    let config = loader::load_config_from_str(toml_content).map_err(|err| {
        let inline = [("<inline>".to_owned(), toml_content.to_owned())];
        diagnostic::figment_to_config_errors(err, &inline)
    })?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Contents of every candidate file that exists, keyed the way figment
/// names the file in error metadata.
fn read_sources() -> Vec<(String, String)> {
    loader::config_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let absolute = std::path::absolute(&path).unwrap_or(path);
            Some((absolute.display().to_string(), content))
        })
        .collect()
}
