//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - The synchronous `Cursor` capability and dialect identification
//! - Blocking sqlx-backed cursors for MySQL, PostgreSQL and SQLite
//! - Query execution with timing and query logging
//! - Dialect-specific SQL generation
//! - Type mappings

pub mod cursor;
pub mod dialect;
pub mod executor;
pub mod pool;
pub mod queries;
pub mod types;

pub use cursor::{Cursor, Tagged};
pub use dialect::{DRIVER_SIGNATURES, Dialect, identify};
pub use executor::{QueryExecutor, QueryLog, TracingLog};
pub use pool::{Fetched, MySqlCursor, PgCursor, SqliteCursor, SqlxCursor, SqlxSource};
pub use queries::{DialectQueries, ExistenceCheck, QueryBuilder, SqlInterpolator, Verbatim};
