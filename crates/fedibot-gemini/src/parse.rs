// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loose shape validation for generated JSON.
//!
//! The model is asked for a specific JSON shape but is free to disobey.
//! [`Parsed`] makes that a normal, typed outcome instead of an error so
//! call sites decide per item whether a miss is skippable.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Outcome of validating a generated value against an expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    /// The generation came back but did not match the expected shape.
    ParseFailed,
}

impl<T: DeserializeOwned> Parsed<T> {
    /// Validate `value` against `T`, logging the mismatch on failure.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(parsed) => Parsed::Value(parsed),
            Err(e) => {
                warn!(error = %e, "generated JSON did not match expected shape");
                Parsed::ParseFailed
            }
        }
    }
}

impl<T> Parsed<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Parsed::Value(v) => Some(v),
            Parsed::ParseFailed => None,
        }
    }
}
