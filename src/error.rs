//! Error types for sqlutil.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Nothing here is retried: every variant is reported to the immediate caller.

use crate::db::Dialect;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Unsupported cursor type: {type_name}")]
    UnsupportedDialect { type_name: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Unsupported operation: {operation} is not available for {dialect}")]
    UnsupportedOperation { operation: String, dialect: Dialect },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Invalid LIMIT value in query: '{candidate}'")]
    LimitParse { candidate: String },

    #[error("Row {row} has {found} values but the result set has {expected} columns")]
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Schema error: {message} (object: {object})")]
    Schema { message: String, object: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create an unsupported dialect error for a cursor's runtime type name.
    pub fn unsupported_dialect(type_name: impl Into<String>) -> Self {
        Self::UnsupportedDialect {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error.
    pub fn unsupported_operation(operation: impl Into<String>, dialect: Dialect) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            dialect,
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    pub fn limit_parse(candidate: impl Into<String>) -> Self {
        Self::LimitParse {
            candidate: candidate.into(),
        }
    }

    pub fn row_arity(row: usize, expected: usize, found: usize) -> Self {
        Self::RowArity {
            row,
            expected,
            found,
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            object: object.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::LimitParse { .. } => {
                Some("Pass an explicit display limit or write LIMIT as the last clause")
            }
            _ => None,
        }
    }

    /// True if the driver rejected the statement during execute/fetch.
    pub fn is_query_fault(&self) -> bool {
        matches!(self, Self::Database { .. })
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => DbError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out acquiring a connection",
                "Check that the database server is reachable",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::TypeNotFound { type_name } => DbError::schema(
                format!("Type not found: {}", type_name),
                type_name.to_string(),
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::schema(format!("Column not found: {}", col), col.to_string())
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
