// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup for applications embedding serialite.

use serialite_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install a fmt subscriber logging serialite at `log_level`.
///
/// `RUST_LOG` takes precedence when set. Other crates log at `warn`.
/// Consumer worker threads are named, so thread names are included.
pub fn init_tracing(log_level: &str) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(log_level))
        .with_target(true)
        .with_thread_names(true)
        .try_init()
}

/// Install a subscriber using the `[logging]` section of the configuration.
pub fn init_from_config(config: &LoggingConfig) -> Result<(), InitError> {
    init_tracing(&config.level)
}

fn filter_for(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)))
}

fn default_directives(log_level: &str) -> String {
    format!("serialite={log_level},warn")
}
