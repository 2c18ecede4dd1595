// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading via figment.
//!
//! Files are read in XDG order (`/etc/fedibot/fedibot.toml`, the user
//! config dir, then `./fedibot.toml`), with `FEDIBOT_*` environment
//! variables taking final precedence.

#![allow(clippy::result_large_err)] // figment::Error is an external type

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use tracing::debug;

use crate::model::FedibotConfig;

/// Load configuration from the XDG hierarchy, later layers overriding
/// earlier: compiled defaults, system file, user file, local file, then
/// `FEDIBOT_*` environment variables.
pub fn load_config() -> Result<FedibotConfig, figment::Error> {
    let user_file = dirs::config_dir()
        .map(|d| d.join("fedibot/fedibot.toml"))
        .unwrap_or_default();
    debug!(user_file = %user_file.display(), "loading configuration");
    Figment::new()
        .merge(Serialized::defaults(FedibotConfig::default()))
        .merge(Toml::file("/etc/fedibot/fedibot.toml"))
        .merge(Toml::file(user_file))
        .merge(Toml::file("fedibot.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FedibotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FedibotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<FedibotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FedibotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FEDIBOT_GEMINI_API_KEY` must map to
/// `gemini.api_key`, not `gemini.api.key`.
fn env_provider() -> Env {
    Env::prefixed("FEDIBOT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("mastodon_", "mastodon.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("server_", "server.", 1)
            .replacen("batch_", "batch.", 1);
        mapped.into()
    })
}
