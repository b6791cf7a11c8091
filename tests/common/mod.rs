//! Scripted in-memory cursor shared by the integration tests.

#![allow(dead_code)]

use sqlutil::db::{Cursor, Dialect, Tagged};
use sqlutil::error::{DbError, DbResult};
use sqlutil::models::{ColumnDescription, ColumnShape, Row, Value};
use std::collections::VecDeque;

/// Canned answer for every statement containing `pattern`.
#[derive(Debug, Clone)]
pub struct Script {
    pub pattern: String,
    pub columns: ColumnShape,
    pub rows: Vec<Row>,
    pub error: Option<String>,
}

impl Script {
    pub fn rows(pattern: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        Self {
            pattern: pattern.to_string(),
            columns: ColumnShape::Descriptions(
                columns.iter().map(|c| ColumnDescription::new(*c)).collect(),
            ),
            rows,
            error: None,
        }
    }

    pub fn named(pattern: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        Self {
            columns: ColumnShape::Names(columns.iter().map(|c| c.to_string()).collect()),
            ..Self::rows(pattern, &[], rows)
        }
    }

    pub fn fails(pattern: &str, message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::rows(pattern, &[], Vec::new())
        }
    }
}

/// Cursor answering from scripts and recording every executed statement.
#[derive(Debug, Default)]
pub struct ScriptedCursor {
    pub scripts: Vec<Script>,
    pub executed: Vec<String>,
    pub type_name: Option<&'static str>,
    columns: ColumnShape,
    pending: VecDeque<Row>,
}

impl ScriptedCursor {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts,
            ..Self::default()
        }
    }

    /// Pretend to be a driver type with the given runtime name.
    pub fn disguised(type_name: &'static str) -> Self {
        Self {
            type_name: Some(type_name),
            ..Self::default()
        }
    }

    pub fn tagged(dialect: Dialect, scripts: Vec<Script>) -> Tagged<Self> {
        Tagged::new(Self::new(scripts), dialect)
    }
}

impl Cursor for ScriptedCursor {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.executed.push(sql.to_string());
        self.pending.clear();
        self.columns = ColumnShape::default();

        let Some(script) = self.scripts.iter().find(|s| sql.contains(&s.pattern)) else {
            return Ok(());
        };
        if let Some(message) = &script.error {
            return Err(DbError::database(message.clone(), Some("42000".to_string())));
        }
        self.columns = script.columns.clone();
        self.pending = script.rows.iter().cloned().collect();
        Ok(())
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        Ok(self.pending.drain(..).collect())
    }

    fn fetch_one(&mut self) -> DbResult<Option<Row>> {
        Ok(self.pending.pop_front())
    }

    fn columns(&self) -> ColumnShape {
        self.columns.clone()
    }

    fn type_name(&self) -> &str {
        self.type_name
            .unwrap_or_else(|| std::any::type_name::<Self>())
    }
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub fn int(v: i64) -> Value {
    Value::Int(v)
}
