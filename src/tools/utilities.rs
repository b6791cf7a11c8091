//! High-level database utilities.
//!
//! `SqlUtilities` binds one cursor to its dialect and exposes the logical
//! operations (list tables, describe columns, summary statistics, ...) as
//! single calls that build the SQL, run it and print the result table.
//! Every display operation also returns the structured `QueryOutcome`.

use crate::db::cursor::Cursor;
use crate::db::dialect::{Dialect, identify};
use crate::db::executor::{QueryExecutor, QueryLog};
use crate::db::queries::{ExistenceCheck, QueryBuilder, SqlInterpolator};
use crate::error::DbResult;
use crate::models::query::format_secs;
use crate::models::{DEFAULT_DISPLAY_LIMIT, QueryOutcome, Value};
use crate::tools::format::render_outcome;
use crate::tools::limit::infer_limit;
use std::io::{self, Stdout, Write};
use tracing::debug;

const BANNER_DASHES: &str = "====================";

/// Query-and-display operations over one cursor.
pub struct SqlUtilities<'a, C: Cursor, W: Write = Stdout> {
    cursor: C,
    dialect: Dialect,
    builder: QueryBuilder,
    executor: QueryExecutor<'a>,
    out: W,
}

impl<C: Cursor> SqlUtilities<'static, C, Stdout> {
    /// Identify the cursor's dialect and print results to standard output.
    pub fn new(cursor: C) -> DbResult<Self> {
        Self::with_output(cursor, io::stdout())
    }
}

impl<C: Cursor, W: Write> SqlUtilities<'static, C, W> {
    /// Identify the cursor's dialect and print results to `out`.
    pub fn with_output(cursor: C, out: W) -> DbResult<Self> {
        let dialect = identify(&cursor)?;
        debug!(dialect = %dialect, "Resolved cursor dialect");
        Ok(Self {
            cursor,
            dialect,
            builder: QueryBuilder::new(dialect),
            executor: QueryExecutor::new(),
            out,
        })
    }
}

impl<'a, C: Cursor, W: Write> SqlUtilities<'a, C, W> {
    /// Report every statement to `logger` before it runs.
    pub fn with_logger<'b>(self, logger: &'b dyn QueryLog) -> SqlUtilities<'b, C, W> {
        SqlUtilities {
            cursor: self.cursor,
            dialect: self.dialect,
            builder: self.builder,
            executor: QueryExecutor::with_logger(logger),
            out: self.out,
        }
    }

    /// Replace how names and values are written into generated SQL.
    pub fn with_interpolator(mut self, interpolator: impl SqlInterpolator + 'static) -> Self {
        self.builder = self.builder.with_interpolator(interpolator);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut C {
        &mut self.cursor
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_parts(self) -> (C, W) {
        (self.cursor, self.out)
    }

    fn fetch(&mut self, sql: &str) -> DbResult<QueryOutcome> {
        self.executor.execute_query(&mut self.cursor, sql)
    }

    fn show(&mut self, sql: &str, display_limit: usize) -> DbResult<QueryOutcome> {
        let outcome = self.fetch(sql)?;
        render_outcome(&mut self.out, &outcome, display_limit)?;
        Ok(outcome)
    }

    /// Run `sql` and print its result, capped by a `LIMIT` found in the text
    /// or the default display limit.
    pub fn display_query(&mut self, sql: &str) -> DbResult<QueryOutcome> {
        self.display_query_with_limit(sql, None)
    }

    /// Run `sql` and print at most `limit` rows. Without an explicit limit it
    /// is inferred from the SQL text before anything is executed.
    pub fn display_query_with_limit(
        &mut self,
        sql: &str,
        limit: Option<usize>,
    ) -> DbResult<QueryOutcome> {
        let display_limit = infer_limit(sql, limit)?;
        self.show(sql, display_limit)
    }

    /// Execute a statement without fetching or printing rows.
    pub fn execute_query(&mut self, sql: &str) -> DbResult<()> {
        let elapsed = self.executor.run(&mut self.cursor, sql)?;
        writeln!(
            self.out,
            "Query ran successfully in time: ({} sec)",
            format_secs(elapsed)
        )?;
        Ok(())
    }

    pub fn select_all(&mut self, table: &str) -> DbResult<QueryOutcome> {
        let sql = self.builder.select_all(table)?;
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    pub fn show_databases(&mut self) -> DbResult<QueryOutcome> {
        let sql = self.builder.list_databases();
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    /// Tables of `database`, or of the current database when `None`.
    pub fn list_tables(&mut self, database: Option<&str>) -> DbResult<QueryOutcome> {
        let sql = self.builder.list_tables(database)?;
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    /// Views of `database`, or of the current database when `None`.
    pub fn list_views(&mut self, database: Option<&str>) -> DbResult<QueryOutcome> {
        let sql = self.builder.list_views(database)?;
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    pub fn show_columns(&mut self, table: &str) -> DbResult<QueryOutcome> {
        let schema = self.lookup_schema(table)?;
        let sql = self.builder.show_columns(table, schema.as_deref())?;
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    pub fn current_database(&mut self) -> DbResult<QueryOutcome> {
        let sql = self.builder.current_database()?;
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    /// Whether a database called `name` exists. Prints nothing.
    pub fn database_exists(&mut self, name: &str) -> DbResult<bool> {
        let check = self.builder.database_exists(name)?;
        let outcome = self.fetch(check.sql())?;
        let exists = match check {
            ExistenceCheck::AnyRow(_) => !outcome.rows.is_empty(),
            ExistenceCheck::NameInColumn { column, .. } => outcome
                .rows
                .iter()
                .any(|row| row.get(column).is_some_and(|v| v.to_string() == name)),
        };
        debug!(database = %name, exists, "Checked database existence");
        Ok(exists)
    }

    /// Schema holding `table`, for dialects that qualify tables by schema.
    fn lookup_schema(&mut self, table: &str) -> DbResult<Option<String>> {
        let Some(sql) = self.builder.table_schema(None, table)? else {
            return Ok(None);
        };
        let outcome = self.fetch(&sql)?;
        Ok(outcome
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Print aggregate statistics for every eligible column of `table`.
    ///
    /// Numeric columns get COUNT, MAX, MIN, AVG and SUM; date/time columns
    /// get COUNT, MAX and MIN. Key columns and columns whose name contains
    /// `_id` are skipped, as is every column outside `columns` when given.
    ///
    /// Nothing is printed until every column query has been built. A column
    /// query the database rejects stops the run after the banner and the
    /// tables of the columns before it.
    pub fn summary_statistics(
        &mut self,
        table: &str,
        columns: Option<&[&str]>,
    ) -> DbResult<Vec<QueryOutcome>> {
        let schema = self.lookup_schema(table)?;
        let metadata_sql = self.builder.column_metadata(table, schema.as_deref())?;
        let metadata = self.fetch(&metadata_sql)?;
        let queries = metadata
            .rows
            .iter()
            .map(|row| self.builder.parse_column_metadata(row))
            .filter(|parsed| parsed.as_ref().map_or(true, |c| c.wants_summary(columns)))
            .map(|parsed| {
                parsed.and_then(|column| {
                    self.builder
                        .summary_query(table, schema.as_deref(), &column)
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        writeln!(
            self.out,
            "{BANNER_DASHES} SUMMARY STATISTICS FOR {table} TABLE {BANNER_DASHES}"
        )?;

        let mut outcomes = Vec::with_capacity(queries.len());
        for sql in &queries {
            outcomes.push(self.show(sql, DEFAULT_DISPLAY_LIMIT)?);
        }
        Ok(outcomes)
    }

    /// Print the 1-based position of `needle` in `haystack` as computed by
    /// the database (0 when absent).
    pub fn find_substring(&mut self, needle: &str, haystack: &str) -> DbResult<QueryOutcome> {
        let sql = self.builder.substring_position(needle, haystack);
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }

    /// The table's `CREATE TABLE IF NOT EXISTS` statement, printed and
    /// returned. MySQL only.
    pub fn create_table_statement(&mut self, table: &str) -> DbResult<Option<String>> {
        let sql = self.builder.create_table_statement(table)?;
        let outcome = self.fetch(&sql)?;
        let Some(ddl) = outcome.rows.first().and_then(|row| row.get(1)) else {
            return Ok(None);
        };
        let statement = ddl
            .to_string()
            .replace("CREATE TABLE", "CREATE TABLE IF NOT EXISTS");
        writeln!(self.out, "{statement}")?;
        Ok(Some(statement))
    }

    /// Call a stored procedure and print its first result set.
    pub fn call_procedure(&mut self, name: &str, args: &[Value]) -> DbResult<QueryOutcome> {
        let sql = self.builder.call_procedure(name, args)?;
        let printed = args
            .iter()
            .map(|v| match v {
                Value::Null => "NULL".to_string(),
                Value::Text(s) => format!("'{s}'"),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            self.out,
            "Calling the Procedure '{name}' with parameters ({printed})"
        )?;
        self.show(&sql, DEFAULT_DISPLAY_LIMIT)
    }
}

impl<C: Cursor, W: Write> std::fmt::Debug for SqlUtilities<'_, C, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlUtilities")
            .field("dialect", &self.dialect)
            .field("builder", &self.builder)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}
