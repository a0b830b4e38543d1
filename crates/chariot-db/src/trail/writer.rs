//! JSONL change-log writer.
//!
//! Appends `TrailOperation` records to `{trail_dir}/{YYYY-MM-DD}.jsonl` using
//! `serde_jsonlines::append_json_lines` for per-line appends.

use std::path::PathBuf;

use chariot_core::trail::TrailOperation;
use chrono::{DateTime, NaiveDate};

use crate::error::DatabaseError;

/// Appends change-log operations to daily JSONL files.
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a writer for `trail_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&trail_dir)?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// A writer that drops every operation.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append `op` to the file for the day of `op.ts`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `op.ts` is not RFC 3339 or the write fails.
    pub fn append(&self, op: &TrailOperation) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }
        let day = DateTime::parse_from_rfc3339(&op.ts)
            .map_err(|e| DatabaseError::Other(anyhow::anyhow!("bad trail timestamp {}: {e}", op.ts)))?
            .date_naive();
        serde_jsonlines::append_json_lines(self.path_for(day), [op])?;
        Ok(())
    }

    /// Every operation logged on `day`, in append order. A day without a
    /// file yields nothing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file exists but cannot be parsed.
    pub fn read_day(&self, day: NaiveDate) -> Result<Vec<TrailOperation>, DatabaseError> {
        let path = self.path_for(day);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let ops = serde_jsonlines::json_lines::<TrailOperation, _>(&path)?
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(ops)
    }

    fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.trail_dir.join(format!("{}.jsonl", day.format("%Y-%m-%d")))
    }
}
