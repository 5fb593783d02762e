//! Per-language curriculum progress.
//!
//! One row per language holding the current topic index. The index only
//! moves forward (clamped to the caller-supplied bound) except on an
//! explicit reset. Each operation runs as one closure under the
//! connection mutex, so concurrent advances for the same language cannot
//! interleave into a lost update.

use super::Db;
use crate::errors::ToolError;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProgressStore {
    db: Arc<Db>,
}

impl ProgressStore {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Current topic index for a language; languages never seen before
    /// start at 0.
    pub fn current(&self, language: &str) -> Result<i64, ToolError> {
        self.db.with_conn(|conn| {
            let index: Option<i64> = conn
                .query_row(
                    "SELECT current_topic_index FROM learning_progress WHERE language = ?1",
                    params![language],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(index.unwrap_or(0))
        })
    }

    /// Advance the index by one, clamped to `max`. Returns the index
    /// after the update. A language already at or past `max` is left
    /// unchanged.
    pub fn advance_clamped(&self, language: &str, max: i64) -> Result<i64, ToolError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO learning_progress (language, current_topic_index, updated_at)
                 VALUES (?1, 0, ?2)
                 ON CONFLICT(language) DO NOTHING",
                params![language, now],
            )?;
            conn.execute(
                "UPDATE learning_progress
                 SET current_topic_index = MIN(current_topic_index + 1, ?2), updated_at = ?3
                 WHERE language = ?1",
                params![language, max, now],
            )?;
            conn.query_row(
                "SELECT current_topic_index FROM learning_progress WHERE language = ?1",
                params![language],
                |row| row.get(0),
            )
        })
    }

    /// Reset a language's index to 0. Always succeeds.
    pub fn reset(&self, language: &str) -> Result<(), ToolError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO learning_progress (language, current_topic_index, updated_at)
                 VALUES (?1, 0, ?2)
                 ON CONFLICT(language) DO UPDATE
                 SET current_topic_index = 0, updated_at = ?2",
                params![language, now],
            )?;
            Ok(())
        })
    }
}
