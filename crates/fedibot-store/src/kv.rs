// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uniform get/put/query/batch-write operations over the sorted
//! composite-key table.
//!
//! Every persisted record is a `(pk, sk)` pair with a JSON payload and an
//! optional expiry. Expired rows are treated as absent on read; a sweep is
//! piggybacked on writes rather than run by a background task, since batch
//! invocations are short-lived.

use chrono::Utc;
use fedibot_core::FedibotError;
use rusqlite::params;
use serde_json::Value;
use tracing::debug;

use crate::database::{map_tr_err, Database};

/// Maximum number of items written per transaction in [`KvStore::batch_write`].
pub const MAX_BATCH_SIZE: usize = 25;

/// A record in the composite-key store.
#[derive(Debug, Clone, PartialEq)]
pub struct KvItem {
    pub pk: String,
    pub sk: String,
    /// JSON payload; shape is owned by the typed store that wrote it.
    pub payload: Value,
    /// Unix seconds after which the record is treated as absent.
    pub expire_at: Option<i64>,
}

/// Thin, untyped store exposing the four primitive operations the typed
/// stores are built on.
pub struct KvStore<'a> {
    db: &'a Database,
}

impl<'a> KvStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Fetch a single record by full key. Expired records read as `None`.
    pub async fn get(&self, pk: &str, sk: &str) -> Result<Option<KvItem>, FedibotError> {
        let pk = pk.to_string();
        let sk = sk.to_string();
        let now = Utc::now().timestamp();
        let (query_pk, query_sk) = (pk.clone(), sk.clone());
        let row = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<(String, Option<i64>)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT payload, expire_at FROM kv WHERE pk = ?1 AND sk = ?2",
                )?;
                let result = stmt.query_row(params![query_pk, query_sk], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
                });
                match result {
                    Ok(found) => Ok(Some(found)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;

        match row {
            Some((_, Some(expire_at))) if expire_at <= now => Ok(None),
            Some((payload, expire_at)) => {
                let payload = parse_payload(&payload)?;
                Ok(Some(KvItem {
                    pk,
                    sk,
                    payload,
                    expire_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// Write a record unconditionally (last-writer-wins).
    pub async fn put(&self, item: KvItem) -> Result<(), FedibotError> {
        let payload = item.payload.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO kv (pk, sk, payload, expire_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![item.pk, item.sk, payload, item.expire_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Write a record only if no live record exists at the key.
    ///
    /// Enforced by the primary-key constraint, not a pre-read, so two
    /// concurrent first-time writers cannot both succeed. An expired row
    /// at the key is replaced.
    pub async fn put_if_absent(&self, item: KvItem) -> Result<(), FedibotError> {
        let key = format!("{}/{}", item.pk, item.sk);
        let payload = item.payload.to_string();
        let now = Utc::now().timestamp();
        let result = self
            .db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "DELETE FROM kv WHERE pk = ?1 AND sk = ?2
                     AND expire_at IS NOT NULL AND expire_at <= ?3",
                    params![item.pk, item.sk, now],
                )?;
                conn.execute(
                    "INSERT OR ABORT INTO kv (pk, sk, payload, expire_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![item.pk, item.sk, payload, item.expire_at],
                )?;
                Ok(())
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(FedibotError::AlreadyExists { key }),
            Err(e) => Err(map_tr_err(e)),
        }
    }

    /// Fetch up to `limit` live records in a partition, ordered by sort key
    /// descending (newest-first for timestamp-keyed partitions).
    pub async fn query_desc(&self, pk: &str, limit: u32) -> Result<Vec<KvItem>, FedibotError> {
        let pk = pk.to_string();
        let now = Utc::now().timestamp();
        let rows = self
            .db
            .connection()
            .call(
                move |conn| -> Result<Vec<(String, String, String, Option<i64>)>, rusqlite::Error> {
                    let mut stmt = conn.prepare(
                        "SELECT pk, sk, payload, expire_at FROM kv
                         WHERE pk = ?1 AND (expire_at IS NULL OR expire_at > ?2)
                         ORDER BY sk DESC LIMIT ?3",
                    )?;
                    let rows = stmt.query_map(params![pk, now, limit], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                    })?;
                    rows.collect()
                },
            )
            .await
            .map_err(map_tr_err)?;

        rows.into_iter()
            .map(|(pk, sk, payload, expire_at)| {
                Ok(KvItem {
                    pk,
                    sk,
                    payload: parse_payload(&payload)?,
                    expire_at,
                })
            })
            .collect()
    }

    /// Write many records, chunked into transactions of at most
    /// [`MAX_BATCH_SIZE`] items each.
    pub async fn batch_write(&self, items: Vec<KvItem>) -> Result<(), FedibotError> {
        for chunk in items.chunks(MAX_BATCH_SIZE) {
            let chunk: Vec<(String, String, String, Option<i64>)> = chunk
                .iter()
                .map(|item| {
                    (
                        item.pk.clone(),
                        item.sk.clone(),
                        item.payload.to_string(),
                        item.expire_at,
                    )
                })
                .collect();
            let written = chunk.len();
            self.db
                .connection()
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    let tx = conn.transaction()?;
                    for (pk, sk, payload, expire_at) in &chunk {
                        tx.execute(
                            "INSERT OR REPLACE INTO kv (pk, sk, payload, expire_at)
                             VALUES (?1, ?2, ?3, ?4)",
                            params![pk, sk, payload, expire_at],
                        )?;
                    }
                    tx.commit()?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!(written, "batch chunk committed");
        }
        Ok(())
    }
}

/// Stored payloads are written by this process; a parse failure is a data
/// corruption signal and surfaces as a fatal store error, never a silent
/// repair.
fn parse_payload(raw: &str) -> Result<Value, FedibotError> {
    serde_json::from_str(raw).map_err(|e| FedibotError::Store {
        source: Box::new(e),
    })
}

fn is_constraint_violation(e: &tokio_rusqlite::Error<rusqlite::Error>) -> bool {
    matches!(
        e,
        tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(inner, _))
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
