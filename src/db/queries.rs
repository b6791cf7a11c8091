//! Dialect-specific SQL generation.
//!
//! # Architecture
//!
//! Each dialect has one strategy object implementing `DialectQueries`
//! (`MySqlQueries`, `PostgresQueries`, `SqliteQueries`), reached through a
//! static table indexed by `Dialect`. `QueryBuilder` validates arguments once
//! and delegates to the strategy.
//!
//! Identifiers and values are interpolated into the SQL text. The
//! `SqlInterpolator` trait is the hook for quoting or escaping them; the
//! default `Verbatim` interpolator leaves them untouched.

use crate::db::dialect::Dialect;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnCategory, ColumnDescriptor, Row, Value};

// =============================================================================
// Interpolation
// =============================================================================

/// Turns identifiers and values into SQL text.
pub trait SqlInterpolator: Send + Sync {
    /// Render a table, column, schema or procedure name.
    fn identifier(&self, name: &str) -> String;

    /// Render a string as a SQL string literal.
    fn string_literal(&self, value: &str) -> String;

    /// Render a value as a SQL literal.
    fn value_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Decimal(_) => {
                value.to_string()
            }
            Value::Json(v) => self.string_literal(&v.to_string()),
            other => self.string_literal(&other.to_string()),
        }
    }
}

/// Interpolates names and values exactly as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl SqlInterpolator for Verbatim {
    fn identifier(&self, name: &str) -> String {
        name.to_string()
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{value}'")
    }
}

// =============================================================================
// Strategy Trait
// =============================================================================

/// How to decide whether a database exists from a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceCheck {
    /// The database exists iff the query returns a row.
    AnyRow(String),
    /// The database exists iff some row holds the name in `column`.
    NameInColumn { sql: String, column: usize },
}

impl ExistenceCheck {
    pub fn sql(&self) -> &str {
        match self {
            Self::AnyRow(sql) => sql,
            Self::NameInColumn { sql, .. } => sql,
        }
    }
}

/// SQL text for every logical operation, for one dialect.
pub trait DialectQueries: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn list_databases(&self) -> String;

    /// Query returning the current database name, if the dialect has one.
    fn current_database(&self) -> Option<String>;

    fn list_tables(&self, sql: &dyn SqlInterpolator, database: Option<&str>) -> String;

    fn list_views(&self, sql: &dyn SqlInterpolator, database: Option<&str>) -> String;

    fn show_columns(&self, sql: &dyn SqlInterpolator, table: &str, schema: Option<&str>)
    -> String;

    /// Catalog query whose rows `parse_column_metadata` understands.
    fn column_metadata(
        &self,
        sql: &dyn SqlInterpolator,
        table: &str,
        schema: Option<&str>,
    ) -> String {
        self.show_columns(sql, table, schema)
    }

    fn parse_column_metadata(&self, row: &Row) -> DbResult<ColumnDescriptor>;

    /// Query returning the schema a table lives in. Only needed where tables
    /// must be schema-qualified.
    fn table_schema(
        &self,
        _sql: &dyn SqlInterpolator,
        _database: Option<&str>,
        _table: &str,
    ) -> Option<String> {
        None
    }

    fn database_exists(&self, sql: &dyn SqlInterpolator, name: &str) -> ExistenceCheck;

    fn summary_query(
        &self,
        sql: &dyn SqlInterpolator,
        table_ref: &str,
        column: &ColumnDescriptor,
    ) -> String {
        let col = sql.identifier(&column.name);
        match column.category {
            ColumnCategory::Numeric => format!(
                "SELECT COUNT(*), MAX({col}), MIN({col}), AVG({col}), SUM({col}) FROM {table_ref};"
            ),
            _ => format!("SELECT COUNT(*), MAX({col}), MIN({col}) FROM {table_ref};"),
        }
    }

    fn substring_position(&self, sql: &dyn SqlInterpolator, needle: &str, haystack: &str)
    -> String;

    fn create_table_statement(&self, _sql: &dyn SqlInterpolator, _table: &str) -> Option<String> {
        None
    }

    fn call_procedure(
        &self,
        sql: &dyn SqlInterpolator,
        name: &str,
        args: &[Value],
    ) -> Option<String> {
        let args = args
            .iter()
            .map(|v| sql.value_literal(v))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("CALL {}({});", sql.identifier(name), args))
    }
}

static STRATEGIES: [&dyn DialectQueries; 3] = [&MySqlQueries, &PostgresQueries, &SqliteQueries];

impl Dialect {
    /// The query strategy for this dialect.
    pub fn queries(self) -> &'static dyn DialectQueries {
        let idx = match self {
            Dialect::MySql => 0,
            Dialect::Postgres => 1,
            Dialect::Sqlite => 2,
        };
        STRATEGIES[idx]
    }
}

fn text_at<'r>(row: &'r Row, idx: usize, what: &str) -> DbResult<&'r str> {
    row.get(idx)
        .and_then(Value::as_str)
        .ok_or_else(|| DbError::schema(format!("Missing {what} in column metadata"), what))
}

// =============================================================================
// MySQL
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MySqlQueries;

impl DialectQueries for MySqlQueries {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn list_databases(&self) -> String {
        "SHOW DATABASES;".to_string()
    }

    fn current_database(&self) -> Option<String> {
        Some("SELECT DATABASE();".to_string())
    }

    fn list_tables(&self, sql: &dyn SqlInterpolator, database: Option<&str>) -> String {
        information_schema_listing("BASE TABLE", sql, database)
    }

    fn list_views(&self, sql: &dyn SqlInterpolator, database: Option<&str>) -> String {
        information_schema_listing("VIEW", sql, database)
    }

    fn show_columns(&self, sql: &dyn SqlInterpolator, table: &str, _schema: Option<&str>) -> String {
        format!("SHOW COLUMNS FROM {};", sql.identifier(table))
    }

    /// `SHOW COLUMNS`: Field, Type, Null, Key, Default, Extra
    fn parse_column_metadata(&self, row: &Row) -> DbResult<ColumnDescriptor> {
        let name = text_at(row, 0, "Field")?;
        let declared = text_at(row, 1, "Type")?;
        let key = row.get(3).and_then(Value::as_str).unwrap_or_default();
        Ok(ColumnDescriptor::new(
            name,
            declared,
            matches!(key, "PRI" | "MUL"),
        ))
    }

    fn database_exists(&self, _sql: &dyn SqlInterpolator, _name: &str) -> ExistenceCheck {
        ExistenceCheck::NameInColumn {
            sql: self.list_databases(),
            column: 0,
        }
    }

    fn substring_position(
        &self,
        sql: &dyn SqlInterpolator,
        needle: &str,
        haystack: &str,
    ) -> String {
        format!(
            "SELECT LOCATE({}, {});",
            sql.string_literal(needle),
            sql.string_literal(haystack)
        )
    }

    fn create_table_statement(&self, _sql: &dyn SqlInterpolator, table: &str) -> Option<String> {
        Some(format!("SHOW CREATE TABLE `{table}`;"))
    }
}

fn information_schema_listing(
    table_type: &str,
    sql: &dyn SqlInterpolator,
    database: Option<&str>,
) -> String {
    let schema = match database {
        Some(db) => sql.string_literal(db),
        None => "DATABASE()".to_string(),
    };
    format!(
        "SELECT table_name, table_schema AS \"DATABASE NAME\", table_catalog \
         FROM information_schema.tables WHERE table_type = '{table_type}' \
         AND table_schema = {schema};"
    )
}

// =============================================================================
// PostgreSQL
// =============================================================================

const PG_SYSTEM_SCHEMAS: &str = "('pg_catalog', 'information_schema')";

#[derive(Debug, Clone, Copy)]
pub struct PostgresQueries;

impl PostgresQueries {
    fn catalog_filter(sql: &dyn SqlInterpolator, database: Option<&str>) -> String {
        match database {
            Some(db) => format!("table_catalog = {}", sql.string_literal(db)),
            None => "table_catalog = current_database()".to_string(),
        }
    }
}

impl DialectQueries for PostgresQueries {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn list_databases(&self) -> String {
        "SELECT datname FROM pg_database;".to_string()
    }

    fn current_database(&self) -> Option<String> {
        Some("SELECT current_database();".to_string())
    }

    fn list_tables(&self, sql: &dyn SqlInterpolator, database: Option<&str>) -> String {
        format!(
            "SELECT table_name, table_schema FROM information_schema.tables \
             WHERE {} AND table_type = 'BASE TABLE' \
             AND table_schema NOT IN {PG_SYSTEM_SCHEMAS};",
            Self::catalog_filter(sql, database)
        )
    }

    fn list_views(&self, sql: &dyn SqlInterpolator, database: Option<&str>) -> String {
        format!(
            "SELECT table_name, table_schema FROM information_schema.tables \
             WHERE {} AND table_type = 'VIEW' \
             AND table_schema NOT IN {PG_SYSTEM_SCHEMAS};",
            Self::catalog_filter(sql, database)
        )
    }

    fn show_columns(&self, sql: &dyn SqlInterpolator, table: &str, schema: Option<&str>) -> String {
        let table_lit = sql.string_literal(table);
        let schema_filter = schema
            .map(|s| format!(" AND tc.table_schema = {}", sql.string_literal(s)))
            .unwrap_or_default();
        format!(
            "SELECT c.column_name, c.data_type, c.is_nullable, c.is_identity, c.column_default, \
             CASE WHEN pk.column_name IS NOT NULL THEN 'YES' ELSE 'NO' END AS primary_key \
             FROM information_schema.columns c \
             LEFT JOIN (SELECT kcu.column_name FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
             ON tc.constraint_name = kcu.constraint_name \
             WHERE tc.constraint_type = 'PRIMARY KEY'{schema_filter} \
             AND tc.table_name = {table_lit}) pk \
             ON c.column_name = pk.column_name \
             WHERE c.table_name = {table_lit};"
        )
    }

    fn column_metadata(&self, sql: &dyn SqlInterpolator, table: &str, schema: Option<&str>) -> String {
        let table_lit = sql.string_literal(table);
        let schema_filter = schema
            .map(|s| format!(" AND tc.table_schema = {}", sql.string_literal(s)))
            .unwrap_or_default();
        format!(
            "SELECT c.column_name, c.data_type, \
             CASE WHEN pk.column_name IS NOT NULL THEN 'YES' ELSE 'NO' END AS primary_key \
             FROM information_schema.columns c \
             LEFT JOIN (SELECT kcu.column_name FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
             ON tc.constraint_name = kcu.constraint_name \
             WHERE tc.constraint_type = 'PRIMARY KEY'{schema_filter} \
             AND tc.table_name = {table_lit}) pk \
             ON c.column_name = pk.column_name \
             WHERE c.table_name = {table_lit} \
             ORDER BY c.ordinal_position;"
        )
    }

    /// column_name, data_type, primary_key ('YES' / 'NO')
    fn parse_column_metadata(&self, row: &Row) -> DbResult<ColumnDescriptor> {
        let name = text_at(row, 0, "column_name")?;
        let declared = text_at(row, 1, "data_type")?;
        let primary = row.get(2).and_then(Value::as_str) == Some("YES");
        Ok(ColumnDescriptor::new(name, declared, primary))
    }

    fn table_schema(
        &self,
        sql: &dyn SqlInterpolator,
        database: Option<&str>,
        table: &str,
    ) -> Option<String> {
        Some(format!(
            "SELECT table_schema FROM information_schema.tables \
             WHERE {} AND table_name = {} \
             AND table_schema NOT IN {PG_SYSTEM_SCHEMAS};",
            Self::catalog_filter(sql, database),
            sql.string_literal(table)
        ))
    }

    fn database_exists(&self, sql: &dyn SqlInterpolator, name: &str) -> ExistenceCheck {
        ExistenceCheck::AnyRow(format!(
            "SELECT 1 FROM pg_catalog.pg_database WHERE datname = {};",
            sql.string_literal(name)
        ))
    }

    fn summary_query(
        &self,
        sql: &dyn SqlInterpolator,
        table_ref: &str,
        column: &ColumnDescriptor,
    ) -> String {
        let col = sql.identifier(&column.name);
        let alias = |aggregate: &str| sql.identifier(&format!("{aggregate}_{}", column.name));
        let (max, min) = (alias("MAX"), alias("MIN"));
        match column.category {
            // AVG of a float column is double precision, which ROUND(_, int) rejects.
            ColumnCategory::Numeric => format!(
                "SELECT COUNT(*), MAX({col}) AS {max}, MIN({col}) AS {min}, \
                 ROUND(AVG({col})::numeric, 4) AS {avg}, SUM({col}) AS {sum} FROM {table_ref};",
                avg = alias("AVG"),
                sum = alias("SUM"),
            ),
            _ => format!(
                "SELECT COUNT(*), MAX({col}) AS {max}, MIN({col}) AS {min} FROM {table_ref};"
            ),
        }
    }

    fn substring_position(
        &self,
        sql: &dyn SqlInterpolator,
        needle: &str,
        haystack: &str,
    ) -> String {
        format!(
            "SELECT POSITION({} IN {});",
            sql.string_literal(needle),
            sql.string_literal(haystack)
        )
    }
}

// =============================================================================
// SQLite
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct SqliteQueries;

impl DialectQueries for SqliteQueries {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn list_databases(&self) -> String {
        "PRAGMA database_list;".to_string()
    }

    fn current_database(&self) -> Option<String> {
        None
    }

    fn list_tables(&self, _sql: &dyn SqlInterpolator, _database: Option<&str>) -> String {
        "SELECT name FROM sqlite_schema WHERE type = 'table' AND name NOT LIKE 'sqlite_%';"
            .to_string()
    }

    fn list_views(&self, _sql: &dyn SqlInterpolator, _database: Option<&str>) -> String {
        "SELECT name FROM sqlite_schema WHERE type = 'view' AND name NOT LIKE 'sqlite_%';"
            .to_string()
    }

    fn show_columns(&self, sql: &dyn SqlInterpolator, table: &str, _schema: Option<&str>) -> String {
        format!("PRAGMA table_info({});", sql.identifier(table))
    }

    /// `PRAGMA table_info`: cid, name, type, notnull, dflt_value, pk
    fn parse_column_metadata(&self, row: &Row) -> DbResult<ColumnDescriptor> {
        let name = text_at(row, 1, "name")?;
        let declared = row.get(2).and_then(Value::as_str).unwrap_or_default();
        let pk = row.get(5).and_then(Value::as_i64).unwrap_or(0);
        Ok(ColumnDescriptor::new(name, declared, pk > 0))
    }

    fn database_exists(&self, _sql: &dyn SqlInterpolator, _name: &str) -> ExistenceCheck {
        ExistenceCheck::NameInColumn {
            sql: self.list_databases(),
            column: 1,
        }
    }

    fn substring_position(
        &self,
        sql: &dyn SqlInterpolator,
        needle: &str,
        haystack: &str,
    ) -> String {
        format!(
            "SELECT INSTR({}, {});",
            sql.string_literal(haystack),
            sql.string_literal(needle)
        )
    }

    fn call_procedure(
        &self,
        _sql: &dyn SqlInterpolator,
        _name: &str,
        _args: &[Value],
    ) -> Option<String> {
        None
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// Validating front of the dialect strategies.
pub struct QueryBuilder {
    dialect: Dialect,
    interpolator: Box<dyn SqlInterpolator>,
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

fn require_name<'a>(value: &'a str, what: &str) -> DbResult<&'a str> {
    if value.trim().is_empty() {
        return Err(DbError::invalid_argument(format!(
            "Invalid {what} name. Please provide a non-empty {what} name."
        )));
    }
    Ok(value)
}

impl QueryBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            interpolator: Box::new(Verbatim),
        }
    }

    /// Replace the default verbatim interpolation.
    pub fn with_interpolator(mut self, interpolator: impl SqlInterpolator + 'static) -> Self {
        self.interpolator = Box::new(interpolator);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn strategy(&self) -> &'static dyn DialectQueries {
        self.dialect.queries()
    }

    fn sql(&self) -> &dyn SqlInterpolator {
        self.interpolator.as_ref()
    }

    pub fn list_databases(&self) -> String {
        self.strategy().list_databases()
    }

    pub fn current_database(&self) -> DbResult<String> {
        self.strategy()
            .current_database()
            .ok_or_else(|| DbError::unsupported_operation("current database", self.dialect))
    }

    pub fn list_tables(&self, database: Option<&str>) -> DbResult<String> {
        let database = database.map(|db| require_name(db, "database")).transpose()?;
        Ok(self.strategy().list_tables(self.sql(), database))
    }

    pub fn list_views(&self, database: Option<&str>) -> DbResult<String> {
        let database = database.map(|db| require_name(db, "database")).transpose()?;
        Ok(self.strategy().list_views(self.sql(), database))
    }

    pub fn show_columns(&self, table: &str, schema: Option<&str>) -> DbResult<String> {
        let table = require_name(table, "table")?;
        Ok(self.strategy().show_columns(self.sql(), table, schema))
    }

    pub fn column_metadata(&self, table: &str, schema: Option<&str>) -> DbResult<String> {
        let table = require_name(table, "table")?;
        Ok(self.strategy().column_metadata(self.sql(), table, schema))
    }

    pub fn parse_column_metadata(&self, row: &Row) -> DbResult<ColumnDescriptor> {
        self.strategy().parse_column_metadata(row)
    }

    /// `None` when the dialect does not qualify tables by schema.
    pub fn table_schema(&self, database: Option<&str>, table: &str) -> DbResult<Option<String>> {
        let table = require_name(table, "table")?;
        Ok(self.strategy().table_schema(self.sql(), database, table))
    }

    pub fn database_exists(&self, name: &str) -> DbResult<ExistenceCheck> {
        let name = require_name(name, "database")?;
        Ok(self.strategy().database_exists(self.sql(), name))
    }

    /// Aggregate query for one eligible column. `schema` qualifies the table.
    pub fn summary_query(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &ColumnDescriptor,
    ) -> DbResult<String> {
        let table = require_name(table, "table")?;
        let table_ref = match schema {
            Some(s) => format!("{}.{}", self.sql().identifier(s), self.sql().identifier(table)),
            None => self.sql().identifier(table),
        };
        Ok(self.strategy().summary_query(self.sql(), &table_ref, column))
    }

    pub fn substring_position(&self, needle: &str, haystack: &str) -> String {
        self.strategy()
            .substring_position(self.sql(), needle, haystack)
    }

    pub fn select_all(&self, table: &str) -> DbResult<String> {
        let table = require_name(table, "table")?;
        Ok(format!("SELECT * FROM {};", self.sql().identifier(table)))
    }

    pub fn create_table_statement(&self, table: &str) -> DbResult<String> {
        let table = require_name(table, "table")?;
        self.strategy()
            .create_table_statement(self.sql(), table)
            .ok_or_else(|| DbError::unsupported_operation("SHOW CREATE TABLE", self.dialect))
    }

    pub fn call_procedure(&self, name: &str, args: &[Value]) -> DbResult<String> {
        let name = require_name(name, "procedure")?;
        if let Some(bad) = args.iter().find(|v| matches!(v, Value::Bytes(_))) {
            return Err(DbError::invalid_argument(format!(
                "Procedure parameters must be scalar values, got {}",
                bad.type_name()
            )));
        }
        self.strategy()
            .call_procedure(self.sql(), name, args)
            .ok_or_else(|| DbError::unsupported_operation("stored procedures", self.dialect))
    }
}
