//! Durable storage for the tool server (SQLite).
//!
//! One connection guarded by a mutex. Store methods run their whole
//! read-modify-write sequence inside a single `with_conn` closure, so the
//! mutex serializes every mutation (which covers the per-language
//! serialization the progress state machine needs).

pub mod progress;
pub mod weights;

use crate::errors::ToolError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS weights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    weight REAL NOT NULL,
    unit TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_weights_timestamp ON weights(timestamp DESC);

CREATE TABLE IF NOT EXISTS learning_progress (
    language TEXT PRIMARY KEY,
    current_topic_index INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);
";

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    /// Open (or create) the database at `path` and initialize the schema.
    pub fn open(path: &Path) -> Result<Arc<Self>, ToolError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ToolError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Arc::new(Self {
            conn: Mutex::new(conn),
        }))
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Arc<Self>, ToolError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Arc::new(Self {
            conn: Mutex::new(conn),
        }))
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, ToolError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ToolError::Storage("database lock poisoned".into()))?;
        f(&conn).map_err(ToolError::from)
    }
}
