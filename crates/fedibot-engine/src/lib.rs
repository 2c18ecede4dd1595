// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fedibot agent engine.
//!
//! Ties the persistence, social API, and generative seams together:
//! stream processors for notifications and the home timeline, the OAuth
//! onboarding flow, the persona's life-state subsystem, and the batch
//! orchestrator the scheduler invokes.

pub mod auth;
pub mod batch;
pub mod generator;
pub mod life;
pub mod notifications;
pub mod timeline;

#[cfg(test)]
pub(crate) mod fakes;

pub use auth::AuthFlow;
pub use batch::BatchRunner;
pub use generator::{DecisionService, PersonaDecisions};
pub use life::LifeSystem;
pub use notifications::NotificationProcessor;
pub use timeline::TimelineProcessor;
