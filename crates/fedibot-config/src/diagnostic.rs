// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment deserialization failures into miette diagnostics.
//!
//! Unknown keys get a "did you mean?" suggestion via Jaro-Winkler
//! similarity against the section's valid key set.

use miette::Diagnostic;
use thiserror::Error;

/// Similarity floor below which no correction is suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, rendered through miette at startup.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(fedibot::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, when one is similar enough.
        suggestion: Option<String>,
        valid_keys: String,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(fedibot::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(fedibot::config::missing_key),
        help("add `{key} = <value>` to your fedibot.toml")
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(fedibot::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(fedibot::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    if let Some(candidate) = suggestion {
        format!("did you mean `{candidate}`? Valid keys: {valid_keys}")
    } else {
        format!("valid keys: {valid_keys}")
    }
}

/// Flatten a `figment::Error` (which can hold several failures) into one
/// `ConfigError` per failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter().map(|error| to_config_error(&error)).collect()
}

fn to_config_error(error: &figment::Error) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, allowed) => {
            let valid: Vec<&str> = allowed.to_vec();
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, &valid),
                valid_keys: valid.join(", "),
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.clone().into_owned(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: dotted_path(error),
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.to_string(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn dotted_path(error: &figment::Error) -> String {
    error
        .path
        .iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Pick the valid key most similar to `unknown`, if any clears the
/// threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
