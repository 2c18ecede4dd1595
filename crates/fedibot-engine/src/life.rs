// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persona's simulated day.
//!
//! `wake_up` seeds the morning state; `live` asks the decision service
//! what happens next based on recent history and appends it. Records carry
//! a one-day TTL, so the persona starts fresh each morning.

use std::sync::Arc;

use chrono::Utc;
use fedibot_core::FedibotError;
use fedibot_store::{LifeState, StateStore};
use tracing::{debug, info};

use crate::generator::DecisionService;

const DEFAULT_LOCATION: &str = "at home";
const DEFAULT_SITUATION: &str = "just woke up";
const HISTORY_LIMIT: u32 = 10;

pub struct LifeSystem {
    states: StateStore,
    decisions: Arc<dyn DecisionService>,
}

impl LifeSystem {
    pub fn new(states: StateStore, decisions: Arc<dyn DecisionService>) -> Self {
        Self { states, decisions }
    }

    /// Seed today's first state.
    pub async fn wake_up(&self) -> Result<(), FedibotError> {
        self.states
            .save(&LifeState {
                location: DEFAULT_LOCATION.into(),
                situation: DEFAULT_SITUATION.into(),
                thinking: None,
                action: None,
            })
            .await?;
        info!("woke up");
        Ok(())
    }

    /// Advance the persona's day by one step.
    pub async fn live(&self) -> Result<(), FedibotError> {
        let history = self.states.query_history(HISTORY_LIMIT).await?;
        let now = Utc::now().to_rfc3339();

        let Some(planned) = self.decisions.plan_action(&now, &history).await? else {
            debug!("no action planned; state unchanged");
            return Ok(());
        };

        self.states
            .save(&LifeState {
                location: planned.next_location,
                situation: planned.next_situation,
                thinking: Some(planned.thinking),
                action: Some(planned.action),
            })
            .await?;
        Ok(())
    }
}
