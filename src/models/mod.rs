//! Data models for sqlutil.
//!
//! This module re-exports all model types used throughout the crate.

pub mod column;
pub mod query;
pub mod value;

// Re-export commonly used types
pub use column::{ColumnCategory, ColumnDescription, ColumnDescriptor, ColumnShape};
pub use query::{DEFAULT_DISPLAY_LIMIT, QueryOutcome};
pub use value::{Row, Value};
