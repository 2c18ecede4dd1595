// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini `generateContent` client for the fedibot agent.

pub mod client;
pub mod parse;
pub mod types;

pub use client::GeminiClient;
pub use parse::Parsed;
pub use types::GenerateRequest;
