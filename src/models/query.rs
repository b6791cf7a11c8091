//! Query-related data models.
//!
//! This module defines the structured result of one query execution.

use crate::models::value::{Row, format_float};
use serde::Serialize;
use std::time::Duration;

/// Display limit used when neither the caller nor the SQL text supplies one.
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

/// Rows, column names and timing of one executed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl QueryOutcome {
    pub fn new(columns: Vec<String>, rows: Vec<Row>, elapsed: Duration) -> Self {
        Self {
            columns,
            rows,
            elapsed,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Elapsed wall-clock seconds rounded to milliseconds.
    pub fn elapsed_secs(&self) -> f64 {
        round_secs(self.elapsed)
    }
}

/// Round a duration to seconds with three decimals.
pub fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

/// Seconds as printed in summaries: `0.012`, `1.0`.
pub fn format_secs(elapsed: Duration) -> String {
    format_float(round_secs(elapsed))
}

fn serialize_secs<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(round_secs(*elapsed))
}
