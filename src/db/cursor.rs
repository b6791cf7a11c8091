//! The cursor capability consumed by the executor.
//!
//! A cursor is owned by the caller. This crate only executes statements on it
//! and reads back rows and column names; it never opens, closes or reconnects.

use crate::db::dialect::Dialect;
use crate::error::DbResult;
use crate::models::{ColumnShape, Row};

/// Synchronous database cursor.
pub trait Cursor {
    /// Execute one SQL statement, replacing any pending result set.
    fn execute(&mut self, sql: &str) -> DbResult<()>;

    /// Take every remaining row of the last result set.
    fn fetch_all(&mut self) -> DbResult<Vec<Row>>;

    /// Take the next row of the last result set, if any.
    fn fetch_one(&mut self) -> DbResult<Option<Row>>;

    /// Column names of the last result set.
    fn columns(&self) -> ColumnShape;

    /// Explicit dialect tag. Untagged cursors are identified by `type_name`.
    fn dialect(&self) -> Option<Dialect> {
        None
    }

    /// Runtime identity used by the fallback identifier.
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        (**self).execute(sql)
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        (**self).fetch_all()
    }

    fn fetch_one(&mut self) -> DbResult<Option<Row>> {
        (**self).fetch_one()
    }

    fn columns(&self) -> ColumnShape {
        (**self).columns()
    }

    fn dialect(&self) -> Option<Dialect> {
        (**self).dialect()
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }
}

/// Attaches an explicit dialect tag to any cursor.
#[derive(Debug)]
pub struct Tagged<C> {
    inner: C,
    dialect: Dialect,
}

impl<C: Cursor> Tagged<C> {
    pub fn new(inner: C, dialect: Dialect) -> Self {
        Self { inner, dialect }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Cursor> Cursor for Tagged<C> {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.inner.execute(sql)
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        self.inner.fetch_all()
    }

    fn fetch_one(&mut self) -> DbResult<Option<Row>> {
        self.inner.fetch_one()
    }

    fn columns(&self) -> ColumnShape {
        self.inner.columns()
    }

    fn dialect(&self) -> Option<Dialect> {
        Some(self.dialect)
    }

    fn type_name(&self) -> &str {
        self.inner.type_name()
    }
}
