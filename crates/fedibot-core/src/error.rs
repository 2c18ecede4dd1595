// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the fedibot agent.

use thiserror::Error;

/// The primary error type used across all fedibot crates.
#[derive(Debug, Error)]
pub enum FedibotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Store errors (database connection, query failure, corrupt persisted records).
    /// Fatal to the current invocation; there is no domain-level retry.
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Remote social API errors (HTTP failure, unexpected response body).
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generative service errors (HTTP failure, or a schema mismatch at the
    /// one call site where it is fatal).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A conditional create-once write found an existing record.
    #[error("record already exists: {key}")]
    AlreadyExists { key: String },

    /// An access token is already persisted; the authorization flow must not rerun.
    #[error("access token already exists")]
    TokenAlreadyExists,

    /// Token exchange was attempted before app registration.
    #[error("app registration not found")]
    AppNotFound,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
