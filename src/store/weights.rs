//! Append-only weight log.
//!
//! Records are never edited; the only destructive operation is the
//! all-or-nothing erase.

use super::Db;
use crate::errors::ToolError;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;
use std::sync::Arc;

/// One logged weight entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeightRecord {
    pub weight: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WeightStore {
    db: Arc<Db>,
}

impl WeightStore {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Validate and normalize a unit string ("KG" -> "kg").
    fn normalize_unit(unit: &str) -> Result<String, ToolError> {
        let unit = unit.trim().to_lowercase();
        match unit.as_str() {
            "kg" | "lbs" => Ok(unit),
            other => Err(ToolError::Validation(format!(
                "unit must be 'kg' or 'lbs', got '{}'",
                other
            ))),
        }
    }

    /// Append a new record; returns its row id.
    pub fn record(&self, weight: f64, unit: &str) -> Result<i64, ToolError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ToolError::Validation(format!(
                "weight must be a positive number, got {}",
                weight
            )));
        }
        let unit = Self::normalize_unit(unit)?;
        let timestamp = Utc::now().to_rfc3339();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO weights (weight, unit, timestamp) VALUES (?1, ?2, ?3)",
                params![weight, unit, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Records newest first. `limit` bounds the result; `None` returns all.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<WeightRecord>, ToolError> {
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT weight, unit, timestamp FROM weights
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                let ts: String = row.get(2)?;
                Ok(WeightRecord {
                    weight: row.get(0)?,
                    unit: row.get(1)?,
                    timestamp: ts
                        .parse::<DateTime<Utc>>()
                        .unwrap_or_else(|_| DateTime::<Utc>::MIN_UTC),
                })
            })?;
            rows.collect()
        })
    }

    /// Most recent record, if any.
    pub fn last(&self) -> Result<Option<WeightRecord>, ToolError> {
        Ok(self.list(Some(1))?.into_iter().next())
    }

    /// Delete every record, returning how many were removed.
    pub fn delete_all(&self) -> Result<usize, ToolError> {
        self.db
            .with_conn(|conn| conn.execute("DELETE FROM weights", []))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WeightStore {
        WeightStore::new(Db::open_in_memory().unwrap())
    }

    #[test]
    fn record_then_last_matches() {
        let s = store();
        let before = Utc::now();
        s.record(75.0, "kg").unwrap();

        let last = s.last().unwrap().expect("record present");
        assert_eq!(last.weight, 75.0);
        assert_eq!(last.unit, "kg");
        assert!(last.timestamp >= before);
    }

    #[test]
    fn list_is_newest_first() {
        let s = store();
        s.record(80.0, "kg").unwrap();
        s.record(79.5, "kg").unwrap();
        s.record(79.0, "kg").unwrap();

        let weights: Vec<f64> = s.list(None).unwrap().iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![79.0, 79.5, 80.0]);
    }

    #[test]
    fn list_respects_limit() {
        let s = store();
        for w in [80.0, 79.0, 78.0] {
            s.record(w, "lbs").unwrap();
        }
        assert_eq!(s.list(Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn delete_all_returns_prior_count() {
        let s = store();
        s.record(80.0, "kg").unwrap();
        s.record(79.0, "kg").unwrap();

        assert_eq!(s.delete_all().unwrap(), 2);
        assert!(s.list(None).unwrap().is_empty());
        assert!(s.last().unwrap().is_none());

        // Deleting again finds nothing
        assert_eq!(s.delete_all().unwrap(), 0);
    }

    #[test]
    fn unit_is_normalized() {
        let s = store();
        s.record(160.0, " LBS ").unwrap();
        assert_eq!(s.last().unwrap().unwrap().unit, "lbs");
    }

    #[test]
    fn invalid_unit_rejected_before_storage() {
        let s = store();
        let err = s.record(75.0, "stone").unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(s.list(None).unwrap().is_empty());
    }

    #[test]
    fn nonpositive_and_nonfinite_weights_rejected() {
        let s = store();
        assert!(matches!(
            s.record(0.0, "kg"),
            Err(ToolError::Validation(_))
        ));
        assert!(matches!(
            s.record(-5.0, "kg"),
            Err(ToolError::Validation(_))
        ));
        assert!(matches!(
            s.record(f64::NAN, "kg"),
            Err(ToolError::Validation(_))
        ));
        assert!(matches!(
            s.record(f64::INFINITY, "kg"),
            Err(ToolError::Validation(_))
        ));
    }
}
