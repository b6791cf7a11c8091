//! Query display tools.
//!
//! This module contains the user-facing side of the crate:
//! - `format`: ASCII table rendering with truncation and timing summary
//! - `limit`: display limit inference from SQL text
//! - `utilities`: one-call operations (list tables, summary statistics, ...)

pub mod format;
pub mod limit;
pub mod utilities;

pub use format::{RenderSummary, print_table, render_outcome, render_table};
pub use limit::infer_limit;
pub use utilities::SqlUtilities;
