//! Database-agnostic type mappings.
//!
//! This module provides utilities for mapping between database-specific types
//! and our unified `Value` type.
//!
//! # Architecture
//!
//! Two classifications live here:
//! 1. `categorize_declared_type` sorts catalog type names (as written in a
//!    table definition) into the summary-statistics categories.
//! 2. `TypeCategory` classifies driver column types so that the
//!    database-specific decoders know which Rust type to extract.

use crate::db::dialect::Dialect;
use crate::models::{ColumnCategory, ColumnDescription, Row, Value};
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row as SqlxRow, Type, TypeInfo};

// =============================================================================
// Declared Type Classification
// =============================================================================

/// Declared types that get COUNT/MAX/MIN/AVG/SUM.
pub const NUMERIC_TYPES: &[&str] = &[
    "tinyint",
    "smallint",
    "mediumint",
    "int",
    "int2",
    "int8",
    "integer",
    "bigint",
    "float",
    "double",
    "decimal",
    "numeric",
    "real",
    "double precision",
    "smallserial",
    "serial",
    "bigserial",
];

/// Declared types that get COUNT/MAX/MIN.
pub const DATE_TYPES: &[&str] = &["date", "datetime", "timestamp"];

/// Reduce a declared type to its base name: `INT(11) UNSIGNED` → `int`,
/// `timestamp without time zone` → `timestamp`.
pub fn normalize_declared_type(declared: &str) -> String {
    let lower = declared.trim().to_lowercase();
    let mut base = match lower.find('(') {
        Some(idx) => {
            let tail = lower[idx..].find(')').map(|end| &lower[idx + end + 1..]);
            format!("{}{}", &lower[..idx], tail.unwrap_or(""))
        }
        None => lower,
    };
    for modifier in [" without time zone", " with time zone", " unsigned", " zerofill"] {
        base = base.replace(modifier, "");
    }
    base.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify a declared column type for summary statistics.
pub fn categorize_declared_type(declared: &str) -> ColumnCategory {
    let base = normalize_declared_type(declared);
    if NUMERIC_TYPES.contains(&base.as_str()) || base.contains("decimal") {
        ColumnCategory::Numeric
    } else if DATE_TYPES.contains(&base.as_str()) {
        ColumnCategory::Temporal
    } else {
        ColumnCategory::Other
    }
}

// =============================================================================
// Driver Type Classification
// =============================================================================

/// Logical category for driver column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Date,
    Time,
    DateTime,
    Timestamp,
    Unknown,
}

/// Classify a driver type name into a logical category.
pub fn categorize_type(type_name: &str, db: Dialect) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == Dialect::Sqlite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    // Temporal types before integers, "interval" and "point" contain "int"
    match lower.as_str() {
        "date" => return TypeCategory::Date,
        "time" => return TypeCategory::Time,
        "datetime" => return TypeCategory::DateTime,
        "timestamp" => {
            // MySQL TIMESTAMP is stored in UTC, PostgreSQL TIMESTAMP has no zone
            return if db == Dialect::MySql {
                TypeCategory::Timestamp
            } else {
                TypeCategory::DateTime
            };
        }
        "timestamptz" => return TypeCategory::Timestamp,
        _ => {}
    }

    // Boolean
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // Integer types
    if lower.contains("int") && lower != "interval" && lower != "point"
        || lower.contains("serial")
        || lower.contains("tiny")
    {
        return TypeCategory::Integer;
    }

    // Float types
    if lower.contains("float")
        || lower.contains("double")
        || lower == "real"
        || lower == "float4"
        || lower == "float8"
    {
        return TypeCategory::Float;
    }

    // JSON types
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "name" {
        return TypeCategory::Text;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Binary data becomes text when it is valid UTF-8. MySQL reports the
/// text columns of `SHOW` statements as BLOB.
pub fn decode_binary_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(s) => Value::Text(s),
        Err(e) => Value::Bytes(e.into_bytes()),
    }
}

/// Widen an `f32` through its shortest decimal form, so `9.1f32` becomes
/// `9.1` rather than `9.100000381469727`.
pub fn widen_f32(v: f32) -> f64 {
    v.to_string().parse().unwrap_or(f64::from(v))
}

/// Resolve a typed decode. A value the typed decoder rejects falls back to
/// its raw text; only when that fails too does the cell become NULL.
fn settle<T>(
    typed: Result<Option<T>, sqlx::Error>,
    wrap: impl FnOnce(T) -> Value,
    raw_text: impl FnOnce() -> Option<String>,
) -> Value {
    match typed {
        Ok(Some(v)) => wrap(v),
        Ok(None) => Value::Null,
        Err(e) => match raw_text() {
            Some(text) => {
                tracing::debug!(error = %e, "Typed decode failed, keeping text");
                Value::Text(text)
            }
            None => {
                tracing::error!("Failed to decode value: {:?}", e);
                Value::Null
            }
        },
    }
}

// =============================================================================
// Row to Value Trait
// =============================================================================

/// Trait for converting driver rows into `Row`s.
pub trait RowToValues {
    fn to_values(&self) -> Row;
    fn column_descriptions(&self) -> Vec<ColumnDescription>;
}

/// Column descriptions of any sqlx column slice.
pub fn describe_columns<C: Column>(columns: &[C]) -> Vec<ColumnDescription> {
    columns
        .iter()
        .map(|col| ColumnDescription::new(col.name()).with_type(col.type_info().name()))
        .collect()
}

impl RowToValues for MySqlRow {
    fn to_values(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name(), Dialect::MySql);
                mysql::decode_column(self, idx, category)
            })
            .collect()
    }

    fn column_descriptions(&self) -> Vec<ColumnDescription> {
        describe_columns(self.columns())
    }
}

impl RowToValues for PgRow {
    fn to_values(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name(), Dialect::Postgres);
                postgres::decode_column(self, idx, category)
            })
            .collect()
    }

    fn column_descriptions(&self) -> Vec<ColumnDescription> {
        describe_columns(self.columns())
    }
}

impl RowToValues for SqliteRow {
    fn to_values(&self) -> Row {
        (0..self.columns().len())
            .map(|idx| sqlite::decode_column(self, idx))
            .collect()
    }

    fn column_descriptions(&self) -> Vec<ColumnDescription> {
        describe_columns(self.columns())
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;

    pub fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> Value {
        match category {
            TypeCategory::Decimal => typed(row, idx, |v: RawDecimal| Value::Decimal(v.0)),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => typed(row, idx, Value::Bool),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => typed(row, idx, decode_binary_value),
            TypeCategory::Json => typed(row, idx, Value::Json),
            TypeCategory::Date => typed(row, idx, Value::Date),
            TypeCategory::Time => typed(row, idx, Value::Time),
            TypeCategory::DateTime => typed(row, idx, Value::DateTime),
            TypeCategory::Timestamp => typed(row, idx, Value::Timestamp),
            TypeCategory::Text | TypeCategory::Unknown => decode_text(row, idx),
        }
    }

    /// Decode as `T`, keeping the cell's text when `T` rejects it
    /// (`TIME` beyond 24 hours, `YEAR`, `BIT`).
    fn typed<T>(row: &MySqlRow, idx: usize, wrap: impl FnOnce(T) -> Value) -> Value
    where
        T: for<'r> Decode<'r, sqlx::MySql> + Type<sqlx::MySql>,
    {
        settle(row.try_get::<Option<T>, _>(idx), wrap, || raw_text(row, idx))
    }

    fn raw_text(row: &MySqlRow, idx: usize) -> Option<String> {
        row.try_get_unchecked::<Option<String>, _>(idx)
            .ok()
            .flatten()
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> Value {
        // Check NULL first
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return Value::Null;
        }
        // Try signed types
        if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
            return Value::Int(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return Value::Int(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return Value::Int(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return Value::Int(v);
        }
        // Try unsigned types
        if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
            return Value::Int(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u16>, _>(idx) {
            return Value::Int(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
            return Value::Int(v.into());
        }
        typed(row, idx, |v: u64| {
            i64::try_from(v).map(Value::Int).unwrap_or(Value::UInt(v))
        })
    }

    /// FLOAT columns are tried as `f32` first so that the driver does not
    /// widen them before we can.
    fn decode_float(row: &MySqlRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return Value::Float(widen_f32(v));
        }
        typed(row, idx, Value::Float)
    }

    fn decode_text(row: &MySqlRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            return Value::Text(v);
        }
        typed(row, idx, decode_binary_value)
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> Value {
        match category {
            TypeCategory::Decimal => typed(row, idx, |v: RawDecimal| Value::Decimal(v.0)),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => typed(row, idx, Value::Bool),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => typed(row, idx, Value::Bytes),
            TypeCategory::Json => typed(row, idx, Value::Json),
            TypeCategory::Date => typed(row, idx, Value::Date),
            TypeCategory::Time => typed(row, idx, Value::Time),
            TypeCategory::DateTime => typed(row, idx, Value::DateTime),
            TypeCategory::Timestamp => typed(row, idx, Value::Timestamp),
            TypeCategory::Text | TypeCategory::Unknown => typed(row, idx, Value::Text),
        }
    }

    /// Decode as `T`, keeping the cell's text when `T` rejects it. Raw
    /// statements come back in text format, so domains such as
    /// `sql_identifier` and types without a decoder still read as text.
    fn typed<T>(row: &PgRow, idx: usize, wrap: impl FnOnce(T) -> Value) -> Value
    where
        T: for<'r> Decode<'r, sqlx::Postgres> + Type<sqlx::Postgres>,
    {
        settle(row.try_get::<Option<T>, _>(idx), wrap, || {
            row.try_get_unchecked::<Option<String>, _>(idx)
                .ok()
                .flatten()
        })
    }

    fn decode_integer(row: &PgRow, idx: usize) -> Value {
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return Value::Null;
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return Value::Int(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return Value::Int(v.into());
        }
        typed(row, idx, Value::Int)
    }

    fn decode_float(row: &PgRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return Value::Float(widen_f32(v));
        }
        typed(row, idx, Value::Float)
    }
}

mod sqlite {
    use super::*;
    use sqlx::ValueRef;

    /// SQLite is dynamically typed, so the value's storage class decides the
    /// decoder rather than the column's declared type.
    pub fn decode_column(row: &SqliteRow, idx: usize) -> Value {
        let storage = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Ok(raw) => raw.type_info().name().to_uppercase(),
            Err(e) => {
                tracing::error!("Failed to read SQLite value: {:?}", e);
                return Value::Null;
            }
        };

        match storage.as_str() {
            "INTEGER" => row
                .try_get_unchecked::<i64, _>(idx)
                .map(Value::Int)
                .unwrap_or(Value::Null),
            "REAL" => row
                .try_get_unchecked::<f64, _>(idx)
                .map(Value::Float)
                .unwrap_or(Value::Null),
            "BLOB" => row
                .try_get_unchecked::<Vec<u8>, _>(idx)
                .map(Value::Bytes)
                .unwrap_or(Value::Null),
            _ => row
                .try_get_unchecked::<String, _>(idx)
                .map(Value::Text)
                .unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_declared_type() {
        assert_eq!(normalize_declared_type("INT(11) UNSIGNED"), "int");
        assert_eq!(normalize_declared_type("decimal(10,2)"), "decimal");
        assert_eq!(
            normalize_declared_type("timestamp without time zone"),
            "timestamp"
        );
        assert_eq!(normalize_declared_type("Double Precision"), "double precision");
        assert_eq!(normalize_declared_type("varchar(255)"), "varchar");
    }

    #[test]
    fn test_categorize_declared_numeric() {
        for declared in [
            "tinyint",
            "BIGINT",
            "int2",
            "double precision",
            "bigserial",
            "numeric(8,2)",
            "REAL",
            "int unsigned",
        ] {
            assert_eq!(
                categorize_declared_type(declared),
                ColumnCategory::Numeric,
                "{declared}"
            );
        }
        // anything naming decimal counts
        assert_eq!(
            categorize_declared_type("unsigned_decimal"),
            ColumnCategory::Numeric
        );
    }

    #[test]
    fn test_categorize_declared_temporal_and_other() {
        assert_eq!(categorize_declared_type("DATE"), ColumnCategory::Temporal);
        assert_eq!(categorize_declared_type("datetime"), ColumnCategory::Temporal);
        assert_eq!(
            categorize_declared_type("timestamp with time zone"),
            ColumnCategory::Temporal
        );
        assert_eq!(categorize_declared_type("time"), ColumnCategory::Other);
        assert_eq!(categorize_declared_type("text"), ColumnCategory::Other);
        assert_eq!(categorize_declared_type("boolean"), ColumnCategory::Other);
    }

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INT", Dialect::MySql), TypeCategory::Integer);
        assert_eq!(
            categorize_type("BIGINT", Dialect::Postgres),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("TINYINT", Dialect::MySql),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTERVAL", Dialect::Postgres),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(
            categorize_type("DECIMAL", Dialect::MySql),
            TypeCategory::Decimal
        );
        assert_eq!(
            categorize_type("NUMERIC", Dialect::Postgres),
            TypeCategory::Decimal
        );
        // SQLite NUMERIC is a float
        assert_eq!(
            categorize_type("numeric", Dialect::Sqlite),
            TypeCategory::Float
        );
    }

    #[test]
    fn test_categorize_type_temporal() {
        assert_eq!(categorize_type("DATE", Dialect::MySql), TypeCategory::Date);
        assert_eq!(
            categorize_type("TIMESTAMP", Dialect::MySql),
            TypeCategory::Timestamp
        );
        assert_eq!(
            categorize_type("TIMESTAMP", Dialect::Postgres),
            TypeCategory::DateTime
        );
        assert_eq!(
            categorize_type("TIMESTAMPTZ", Dialect::Postgres),
            TypeCategory::Timestamp
        );
    }

    #[test]
    fn test_categorize_type_text() {
        assert_eq!(
            categorize_type("VARCHAR", Dialect::MySql),
            TypeCategory::Text
        );
        assert_eq!(categorize_type("NAME", Dialect::Postgres), TypeCategory::Text);
        assert_eq!(categorize_type("BLOB", Dialect::MySql), TypeCategory::Binary);
    }

    #[test]
    fn test_categorize_type_timetz_reads_as_text() {
        assert_eq!(categorize_type("TIME", Dialect::Postgres), TypeCategory::Time);
        assert_eq!(
            categorize_type("TIMETZ", Dialect::Postgres),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_widen_f32_keeps_shortest_form() {
        assert_eq!(widen_f32(9.1), 9.1);
        assert_eq!(Value::Float(widen_f32(9.1)).to_string(), "9.1");
        assert_eq!(widen_f32(0.3), 0.3);
        assert_eq!(widen_f32(-2.5), -2.5);
        assert_eq!(widen_f32(16_777_216.0), 16_777_216.0);
    }

    fn rejected() -> Result<Option<chrono::NaiveTime>, sqlx::Error> {
        Err(sqlx::Error::ColumnDecode {
            index: "0".to_string(),
            source: "mismatched types; Rust type NaiveTime is not compatible with TIMETZ".into(),
        })
    }

    #[test]
    fn test_settle_keeps_text_of_rejected_value() {
        let value = settle(rejected(), Value::Time, || Some("10:00:00+02".to_string()));
        assert_eq!(value, Value::Text("10:00:00+02".to_string()));
        assert_eq!(value.to_string(), "10:00:00+02");
    }

    #[test]
    fn test_settle_null_and_typed_values() {
        assert_eq!(settle(rejected(), Value::Time, || None), Value::Null);
        assert_eq!(
            settle(Ok(None::<i64>), Value::Int, || Some("ignored".to_string())),
            Value::Null
        );
        assert_eq!(
            settle(Ok(Some(2024_i64)), Value::Int, || None),
            Value::Int(2024)
        );
    }

    #[test]
    fn test_decode_binary_value() {
        assert_eq!(
            decode_binary_value(b"hello world".to_vec()),
            Value::Text("hello world".to_string())
        );
        assert_eq!(
            decode_binary_value(vec![0xFF, 0xFE]),
            Value::Bytes(vec![0xFF, 0xFE])
        );
    }
}
