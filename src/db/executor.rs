//! Query execution engine.
//!
//! This module runs SQL text on a caller-owned cursor and produces a
//! `QueryOutcome`:
//! - An optional query logger sees the literal SQL before it is executed
//! - Elapsed time covers execution plus fetching every row
//! - Column names are normalized from whatever shape the driver exposes
//!
//! Failures are logged once and handed back to the caller unchanged.

use crate::db::cursor::Cursor;
use crate::error::DbResult;
use crate::models::QueryOutcome;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Receives every SQL statement before it runs.
pub trait QueryLog {
    fn info(&self, message: &str);
}

/// Forwards query text to `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl QueryLog for TracingLog {
    fn info(&self, message: &str) {
        info!(target: "sqlutil::query", "{}", message);
    }
}

impl<F: Fn(&str)> QueryLog for F {
    fn info(&self, message: &str) {
        self(message)
    }
}

/// Query executor that handles database query execution.
#[derive(Default)]
pub struct QueryExecutor<'a> {
    logger: Option<&'a dyn QueryLog>,
}

impl std::fmt::Debug for QueryExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl<'a> QueryExecutor<'a> {
    /// Create a new query executor without a query logger.
    pub fn new() -> Self {
        Self { logger: None }
    }

    /// Create a query executor that reports every statement to `logger`.
    pub fn with_logger(logger: &'a dyn QueryLog) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    fn log_query(&self, sql: &str) {
        if let Some(logger) = self.logger {
            logger.info(sql);
        }
        debug!(sql = %sql, "Executing query");
    }

    /// Execute a query and fetch its whole result set.
    pub fn execute_query<C: Cursor + ?Sized>(
        &self,
        cursor: &mut C,
        sql: &str,
    ) -> DbResult<QueryOutcome> {
        self.log_query(sql);
        let start = Instant::now();

        let rows = cursor
            .execute(sql)
            .and_then(|_| cursor.fetch_all())
            .inspect_err(|e| error!(error = %e, "An error occurred"))?;

        let elapsed = start.elapsed();
        let columns = cursor.columns().into_names();
        debug!(
            rows = rows.len(),
            columns = columns.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Query completed"
        );
        Ok(QueryOutcome::new(columns, rows, elapsed))
    }

    /// Execute a statement without fetching rows; returns the elapsed time.
    pub fn run<C: Cursor + ?Sized>(&self, cursor: &mut C, sql: &str) -> DbResult<Duration> {
        self.log_query(sql);
        let start = Instant::now();

        cursor
            .execute(sql)
            .inspect_err(|e| error!(error = %e, "An error occurred"))?;

        let elapsed = start.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, "Statement completed");
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::models::{ColumnDescription, ColumnShape, Row, Value};
    use std::cell::RefCell;

    struct OneShot {
        shape: ColumnShape,
        rows: Vec<Row>,
        fail: bool,
    }

    impl Cursor for OneShot {
        fn execute(&mut self, sql: &str) -> DbResult<()> {
            if self.fail {
                return Err(DbError::database(format!("syntax error near '{sql}'"), None));
            }
            Ok(())
        }

        fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
            Ok(std::mem::take(&mut self.rows))
        }

        fn fetch_one(&mut self) -> DbResult<Option<Row>> {
            Ok(self.rows.pop())
        }

        fn columns(&self) -> ColumnShape {
            self.shape.clone()
        }
    }

    #[test]
    fn test_execute_query_normalizes_descriptions() {
        let mut cursor = OneShot {
            shape: ColumnShape::Descriptions(vec![
                ColumnDescription::new("id").with_type("INTEGER"),
                ColumnDescription::new("name").with_type("TEXT"),
            ]),
            rows: vec![vec![Value::Int(1), Value::from("a")]],
            fail: false,
        };
        let outcome = QueryExecutor::new()
            .execute_query(&mut cursor, "SELECT id, name FROM t")
            .unwrap();
        assert_eq!(outcome.columns, vec!["id", "name"]);
        assert_eq!(outcome.row_count(), 1);
    }

    #[test]
    fn test_logger_sees_literal_sql_first() {
        let seen = RefCell::new(Vec::new());
        let logger = |sql: &str| seen.borrow_mut().push(sql.to_string());
        let mut cursor = OneShot {
            shape: ColumnShape::Names(vec!["x".into()]),
            rows: Vec::new(),
            fail: true,
        };

        let err = QueryExecutor::with_logger(&logger)
            .execute_query(&mut cursor, "SELEC 1")
            .unwrap_err();
        assert!(matches!(err, DbError::Database { .. }));
        assert_eq!(*seen.borrow(), vec!["SELEC 1".to_string()]);
    }

    #[test]
    fn test_run_skips_fetch() {
        let mut cursor = OneShot {
            shape: ColumnShape::default(),
            rows: vec![vec![Value::Null]],
            fail: false,
        };
        QueryExecutor::new().run(&mut cursor, "UPDATE t SET a = 1").unwrap();
        assert_eq!(cursor.rows.len(), 1);
    }
}
