//! Configuration handling for the sqlutil command line.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::models::Value;
use clap::{Parser, Subcommand};
use url::Url;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration for the sqlutil command line.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sqlutil",
    about = "Run SQL against MySQL, PostgreSQL or SQLite and print results as ASCII tables",
    version,
    author
)]
pub struct Config {
    /// Database connection URL (mysql://, postgres://, sqlite:)
    #[arg(
        short = 'd',
        long = "database",
        value_name = "URL",
        env = "SQLUTIL_DATABASE_URL"
    )]
    pub database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "SQLUTIL_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "SQLUTIL_JSON_LOGS")]
    pub json_logs: bool,

    /// Maximum number of rows to print, overriding any LIMIT in the query
    #[arg(long, value_name = "ROWS")]
    pub limit: Option<usize>,

    /// Log every statement at INFO level before it runs
    #[arg(long)]
    pub log_queries: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Operation to run.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Run a query and print its result table
    Query { sql: String },
    /// Execute a statement without printing rows
    Exec { sql: String },
    /// Print every row of a table
    SelectAll { table: String },
    /// List databases
    Databases,
    /// List tables of a database (current database by default)
    Tables { database: Option<String> },
    /// List views of a database (current database by default)
    Views { database: Option<String> },
    /// Describe the columns of a table
    Columns { table: String },
    /// Print the current database name
    CurrentDatabase,
    /// Check whether a database exists
    Exists { name: String },
    /// Print summary statistics for the numeric and date columns of a table
    Stats {
        table: String,
        /// Only these columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Find the 1-based position of a substring, computed by the database
    Find { needle: String, haystack: String },
    /// Print the CREATE TABLE IF NOT EXISTS statement of a MySQL table
    CreateTable { table: String },
    /// Call a stored procedure
    Call {
        name: String,
        /// Procedure arguments; numbers, true/false and null are typed
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Config {
    /// The database URL with any password replaced, safe to log.
    pub fn masked_database_url(&self) -> Option<String> {
        self.database.as_deref().map(mask_password)
    }
}

/// Replace the password of a connection URL with `***`.
pub fn mask_password(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return raw.to_string();
            }
            url.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Type a command-line procedure argument.
pub fn parse_argument(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    Value::Text(raw.to_string())
}
