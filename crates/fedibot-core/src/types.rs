// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the fedibot workspace.
//!
//! The remote-owned types (`Status`, `Notification`, ...) mirror the
//! Mastodon wire format and are read-only from fedibot's perspective.
//! Ids are opaque, lexically ordered strings usable as pagination cursors.

use serde::{Deserialize, Serialize};

/// A remote account, as embedded in statuses and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    /// Webfinger-style handle (`user` or `user@remote.example`).
    pub acct: String,
}

/// An account mentioned within a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub username: String,
    pub acct: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A post on the remote network.
///
/// `reblog` being present marks a reshare; `in_reply_to_id` being present
/// marks a reply. `text` is the plain-text source when the server provides
/// it; otherwise `content` holds HTML that must be stripped before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_account_id: Option<String>,
    pub account: Account,
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
}

/// A notification from the remote network's notification stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

/// Notification variants fedibot acts on. Everything else maps to `Other`
/// and is logged and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    Follow { account: Account },
    Mention { status: Status },
    #[serde(other)]
    Other,
}

/// OAuth app registration returned by `POST /api/v1/apps`.
///
/// Created once per deployment and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRegistration {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub vapid_key: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Long-lived OAuth access token returned by `POST /oauth/token`.
///
/// Created once; never refreshed. A found token is assumed valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// The bot's own identity, from `GET /api/v1/accounts/verify_credentials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub id: String,
    pub username: String,
    pub acct: String,
}

/// Cursor query parameters for stream fetches.
#[derive(Debug, Clone, Default)]
pub struct SinceQuery {
    /// Only items strictly newer than this id are returned.
    pub since_id: Option<String>,
    pub limit: Option<u32>,
}

/// Parameters for posting a status.
#[derive(Debug, Clone)]
pub struct NewStatus {
    pub status: String,
    pub in_reply_to_id: Option<String>,
}
