// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only life-state history with a one-day TTL per record.

use chrono::{Duration, Utc};
use fedibot_core::FedibotError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::database::Database;
use crate::kv::{KvItem, KvStore};

/// A snapshot of what the agent persona is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeState {
    pub location: String,
    pub situation: String,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Store for the agent's life-state history, keyed by UTC timestamp.
pub struct StateStore {
    db: Arc<Database>,
    domain: String,
}

impl StateStore {
    pub fn new(db: Arc<Database>, domain: impl Into<String>) -> Self {
        Self {
            db,
            domain: domain.into(),
        }
    }

    fn pk(&self) -> String {
        format!("app#{}#state", self.domain)
    }

    /// Append a state record keyed by the current UTC time, expiring after
    /// one day.
    pub async fn save(&self, state: &LifeState) -> Result<(), FedibotError> {
        let now = Utc::now();
        let sk = now.to_rfc3339();
        let expire_at = (now + Duration::days(1)).timestamp();
        let payload = serde_json::to_value(state).map_err(|e| FedibotError::Store {
            source: Box::new(e),
        })?;
        let kv = KvStore::new(&self.db);
        kv.put(KvItem {
            pk: self.pk(),
            sk,
            payload,
            expire_at: Some(expire_at),
        })
        .await?;
        debug!(location = %state.location, "life state appended");
        Ok(())
    }

    /// The most recent `limit` states, newest first. Expired records are
    /// excluded.
    pub async fn query_history(&self, limit: u32) -> Result<Vec<LifeState>, FedibotError> {
        let kv = KvStore::new(&self.db);
        let rows = kv.query_desc(&self.pk(), limit).await?;
        rows.into_iter()
            .map(|item| {
                serde_json::from_value(item.payload).map_err(|e| FedibotError::Store {
                    source: Box::new(e),
                })
            })
            .collect()
    }
}
