//! sqlutil library
//!
//! Cross-dialect SQL helpers for MySQL, PostgreSQL and SQLite: identify the
//! dialect behind a cursor, generate dialect-specific catalog queries, run
//! them and print the results as aligned ASCII tables.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod tools;

pub use config::Config;
pub use db::{Cursor, Dialect, QueryExecutor, Tagged, identify};
pub use error::{DbError, DbResult};
pub use models::{QueryOutcome, Row, Value};
pub use tools::{SqlUtilities, infer_limit, render_table};
