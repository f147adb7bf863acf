// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics pointing at the offending
//! key, with a suggestion for near-miss key names.

// Triggered by code the miette derive expands to.
#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One problem found while loading or validating `serialite.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section of the configuration defines.
    #[error("`{key}` is not a serialite setting")]
    #[diagnostic(
        code(serialite::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, if any is similar enough.
        suggestion: Option<String>,
        /// Comma-separated valid keys for the section.
        valid_keys: String,
        /// Location of the offending key.
        #[label("unknown key")]
        span: Option<SourceSpan>,
        /// File the key was read from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(serialite::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A value failed to parse into an enum (e.g. `restart_policy`).
    #[error("`{key}` has an unsupported value: {detail}")]
    #[diagnostic(code(serialite::config::invalid_value))]
    InvalidValue { key: String, detail: String },

    /// A key without a default was not set.
    #[error("`{key}` must be set")]
    #[diagnostic(
        code(serialite::config::missing_key),
        help("add `{key} = <value>` to your serialite.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but is out of range or malformed.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(serialite::config::validation))]
    Validation { message: String },

    /// Anything else figment reports.
    #[error("could not load configuration: {0}")]
    #[diagnostic(code(serialite::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(closest) => format!("closest match is `{closest}` (this section accepts: {valid_keys})"),
        None => format!("this section accepts: {valid_keys}"),
    }
}

/// Splits a figment error, which may carry several failures, into one
/// diagnostic per failure. `sources` pairs file names with their contents.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter().map(|error| to_config_error(error, sources)).collect()
}

fn to_config_error(error: figment::Error, sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    let dotted = error.path.join(".");
    match &error.kind {
        Kind::UnknownField(field, accepted) => {
            let (span, src) = locate_key(&error, field, sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, accepted),
                valid_keys: accepted.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: if dotted.is_empty() {
                field.to_string()
            } else {
                format!("{dotted}.{field}")
            },
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: dotted,
            detail: format!("got {actual}"),
            expected: expected.to_string(),
        },
        Kind::UnknownVariant(variant, accepted) => ConfigError::InvalidValue {
            key: dotted,
            detail: format!("`{variant}`, expected one of {}", accepted.join(", ")),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Finds `field` in the file figment says the error came from. Anything not
/// read from a file matches the `<inline>` entry instead.
fn locate_key(
    error: &figment::Error,
    field: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        _ => "<inline>".to_string(),
    };
    let Some((name, content)) = sources.iter().find(|(name, _)| *name == origin) else {
        return (None, None);
    };

    find_key_offset(content, &error.path, field)
        .map(|offset| {
            (
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(name, content.clone())),
            )
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` within `content`. With a non-empty `path` only the
/// `[path[0]]` table is searched.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut offset = match path.first() {
        Some(table) => {
            let header = format!("[{table}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    for line in content[offset..].split_inclusive('\n') {
        let key_part = line.trim_start();
        if key_part.starts_with('[') && !path.is_empty() {
            return None;
        }
        if let Some(rest) = key_part.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + line.len() - key_part.len());
        }
        offset += line.len();
    }
    None
}

/// The accepted key closest to `unknown`, when it is close enough to be a
/// likely typo.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let (score, key) = valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .max_by(|a, b| a.0.total_cmp(&b.0))?;
    (score > SUGGESTION_THRESHOLD).then(|| key.to_owned())
}

/// Prints every diagnostic to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("serialite: {error}"),
        }
    }
}
