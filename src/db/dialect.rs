//! SQL dialect tags and cursor identification.
//!
//! A dialect is resolved once per cursor: an explicit tag supplied by the
//! cursor wins, and only untagged cursors fall back to matching their runtime
//! type name against the known driver signatures.

use crate::db::cursor::Cursor;
use crate::error::{DbError, DbResult};
use serde::Serialize;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Includes MariaDB
    MySql,
    Postgres,
    Sqlite,
}

/// Runtime type-name fragments of the three supported drivers.
pub const DRIVER_SIGNATURES: [(&str, Dialect); 3] = [
    ("sqlx_mysql", Dialect::MySql),
    ("sqlx_postgres", Dialect::Postgres),
    ("sqlx_sqlite", Dialect::Sqlite),
];

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite];

    /// Parse the dialect from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySql)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    /// Match a runtime type name against `DRIVER_SIGNATURES`, ignoring case.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let lower = type_name.to_lowercase();
        DRIVER_SIGNATURES
            .iter()
            .find(|(signature, _)| lower.contains(signature))
            .map(|(_, dialect)| *dialect)
    }

    /// Get the display name for this dialect.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Postgres => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Resolve the dialect of a cursor without issuing any query.
pub fn identify<C: Cursor + ?Sized>(cursor: &C) -> DbResult<Dialect> {
    if let Some(dialect) = cursor.dialect() {
        return Ok(dialect);
    }
    let type_name = cursor.type_name();
    Dialect::from_type_name(type_name).ok_or_else(|| DbError::unsupported_dialect(type_name))
}
