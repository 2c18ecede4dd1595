// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-stream high-water-mark persistence.
//!
//! Each stream the agent consumes keeps a single `since_id` record. The
//! cursor is the only durable state the incremental fetch loop depends on,
//! so loads distinguish "never seeded" (`None`) from "seeded" explicitly.

use fedibot_core::FedibotError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::database::Database;
use crate::kv::{KvItem, KvStore};

/// The streams fedibot tracks a cursor for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Notifications,
    Timeline,
}

impl Stream {
    fn key_suffix(self) -> &'static str {
        match self {
            Stream::Notifications => "since_id",
            Stream::Timeline => "timeline_since_id",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorRecord {
    since_id: String,
}

/// Typed store for stream cursors, keyed by instance domain.
pub struct CursorStore {
    db: std::sync::Arc<Database>,
    domain: String,
}

impl CursorStore {
    pub fn new(db: std::sync::Arc<Database>, domain: impl Into<String>) -> Self {
        Self {
            db,
            domain: domain.into(),
        }
    }

    fn pk(&self, stream: Stream) -> String {
        format!("app#{}#{}", self.domain, stream.key_suffix())
    }

    /// Load the cursor for `stream`, or `None` if the stream was never
    /// seeded.
    pub async fn find(&self, stream: Stream) -> Result<Option<String>, FedibotError> {
        let kv = KvStore::new(&self.db);
        let item = kv.get(&self.pk(stream), "#").await?;
        match item {
            Some(item) => {
                let record: CursorRecord =
                    serde_json::from_value(item.payload).map_err(|e| FedibotError::Store {
                        source: Box::new(e),
                    })?;
                Ok(Some(record.since_id))
            }
            None => Ok(None),
        }
    }

    /// Persist the cursor for `stream`. Last writer wins.
    pub async fn save(&self, stream: Stream, since_id: &str) -> Result<(), FedibotError> {
        let kv = KvStore::new(&self.db);
        let payload = serde_json::to_value(CursorRecord {
            since_id: since_id.to_string(),
        })
        .map_err(|e| FedibotError::Store {
            source: Box::new(e),
        })?;
        kv.put(KvItem {
            pk: self.pk(stream),
            sk: "#".to_string(),
            payload,
            expire_at: None,
        })
        .await?;
        debug!(stream = ?stream, since_id, "cursor saved");
        Ok(())
    }
}
