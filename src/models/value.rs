//! Scalar cell values.
//!
//! Every driver row is decoded into a `Row` of `Value`s before it reaches the
//! renderer. `Display` is the stringification used for table cells.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// One result row.
pub type Row = Vec<Value>;

/// A nullable scalar value returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// MySQL unsigned BIGINT values that do not fit in `i64`
    UInt(u64),
    Float(f64),
    /// DECIMAL/NUMERIC kept as the exact database text
    Decimal(String),
    Text(String),
    #[serde(serialize_with = "base64_bytes::serialize")]
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Json(JsonValue),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the value as text, if it is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value. Text holding an integer also counts, since
    /// some catalogs report flags as strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Text(s) | Self::Decimal(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get the type name of this value for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Timestamp(_) => "timestamp",
            Self::Json(_) => "json",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Decimal(s) | Self::Text(s) => f.write_str(s),
            Self::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => f.write_str(s),
                Err(_) => {
                    use base64::{Engine as _, engine::general_purpose::STANDARD};
                    f.write_str(&STANDARD.encode(bytes))
                }
            },
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%:z")),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Format a float so that whole numbers keep one fractional digit (`9.0`),
/// which is how numeric cells and elapsed times are shown.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Custom serialization for binary data as base64.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::Serializer;

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_displays_as_token() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_float_display() {
        assert_eq!(Value::Float(9.5).to_string(), "9.5");
        assert_eq!(Value::Float(9.0).to_string(), "9.0");
        assert_eq!(Value::Float(-0.25).to_string(), "-0.25");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn test_temporal_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-09");

        let dt = date.and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-09 14:05:00");

        let ts = dt.and_utc();
        assert_eq!(Value::Timestamp(ts).to_string(), "2024-03-09 14:05:00+00:00");
    }

    #[test]
    fn test_bytes_display() {
        assert_eq!(Value::Bytes(b"hello".to_vec()).to_string(), "hello");
        assert_eq!(Value::Bytes(vec![0xFF, 0xFE, 0x00, 0x01]).to_string(), "//4AAQ==");
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::Text(" 1 ".into()).as_i64(), Some(1));
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("Ann")), Value::Text("Ann".into()));
    }

    #[test]
    fn test_serialize_untagged() {
        let row: Row = vec![Value::Int(1), Value::Null, Value::Bytes(vec![0xFF])];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[1,null,"/w=="]"#);
    }
}
