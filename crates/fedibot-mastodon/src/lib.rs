// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mastodon REST client for the fedibot agent.
//!
//! [`MastodonClient`] implements the [`fedibot_core::SocialApi`] seam;
//! [`html`] and [`pagination`] hold the wire-format helpers the rest of
//! the workspace shares.

pub mod client;
pub mod html;
pub mod pagination;

pub use client::MastodonClient;
pub use html::{strip_html, truncate_chars};
pub use pagination::PageLinks;
