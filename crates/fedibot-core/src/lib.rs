// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the fedibot agent.
//!
//! This crate provides the workspace error type, the domain types shared
//! between the store, API clients, and stream processors, and the
//! [`SocialApi`] trait that the processors are written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FedibotError;
pub use traits::SocialApi;
pub use types::{
    AccessToken, Account, AppRegistration, Credentials, Mention, NewStatus, Notification,
    NotificationKind, SinceQuery, Status,
};
