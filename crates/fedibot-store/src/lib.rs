// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the fedibot agent.
//!
//! All records live in one sorted-composite-key table; typed stores
//! (cursors, credentials, life state) wrap the untyped [`kv::KvStore`]
//! primitives and own their payload shapes and key layout.

pub mod credentials;
pub mod cursor;
pub mod database;
pub mod kv;
pub mod state;

pub use credentials::{AppStore, TokenStore};
pub use cursor::{CursorStore, Stream};
pub use database::Database;
pub use kv::{KvItem, KvStore};
pub use state::{LifeState, StateStore};
