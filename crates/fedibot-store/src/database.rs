// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use fedibot_core::FedibotError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Schema for the sorted-composite-key table backing all fedibot records.
///
/// The `(pk, sk)` primary key is what makes conditional create-once writes
/// race-free: `INSERT OR ABORT` fails on the constraint instead of relying
/// on a read-then-write.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    pk        TEXT NOT NULL,
    sk        TEXT NOT NULL,
    payload   TEXT NOT NULL,
    expire_at INTEGER,
    PRIMARY KEY (pk, sk)
);
";

/// Handle to the SQLite database used by all typed stores.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if necessary) the database at `path` and applies
    /// PRAGMAs and the schema.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, FedibotError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| FedibotError::Store {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Opens an in-memory database. Test-only convenience.
    pub async fn open_in_memory() -> Result<Self, FedibotError> {
        let conn = Connection::open(":memory:")
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(&self) -> Result<(), FedibotError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> FedibotError {
    FedibotError::Store {
        source: Box::new(e),
    }
}
