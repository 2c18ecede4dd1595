// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the fedibot agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level fedibot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values,
/// except that `mastodon.domain` must be set before the agent can run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FedibotConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Remote Mastodon server settings.
    #[serde(default)]
    pub mastodon: MastodonConfig,

    /// Gemini generative API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Auth web entry point settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Batch run tuning.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent; also used as the OAuth client name and
    /// as the body of the `GET /` liveness response.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Default tracing filter when RUST_LOG is unset (trace, debug, info,
    /// warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "fedibot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Remote Mastodon server configuration.
///
/// `domain` doubles as the persistence namespace: every stored record's
/// partition key is prefixed `app#<domain>`, so changing it orphans all
/// cursors and credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MastodonConfig {
    /// Hostname of the Mastodon server, e.g. `mastodon.example`.
    #[serde(default)]
    pub domain: String,
}

/// Gemini generative API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` requires the FEDIBOT_GEMINI_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for generateContent requests.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash-001".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database file location.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Open the database in WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("fedibot").join("fedibot.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("fedibot.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Auth web entry point configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL for building the OAuth redirect URI, e.g.
    /// `https://bot.example.com`. Defaults to the bind address.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Batch run tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Page size for notification fetches (API cap: 80).
    #[serde(default = "default_notification_page_size")]
    pub notification_page_size: u32,

    /// Page size for home-timeline fetches (API cap: 40).
    #[serde(default = "default_timeline_page_size")]
    pub timeline_page_size: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            notification_page_size: default_notification_page_size(),
            timeline_page_size: default_timeline_page_size(),
        }
    }
}

fn default_notification_page_size() -> u32 {
    80
}

fn default_timeline_page_size() -> u32 {
    20
}
