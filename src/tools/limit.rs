//! Display limit inference from SQL text.

use crate::error::{DbError, DbResult};
use crate::models::DEFAULT_DISPLAY_LIMIT;

const KEYWORD: &str = "limit";

/// Decide how many rows to render for `sql`.
///
/// An explicit override always wins. Otherwise the text after the first
/// `limit` (any case) and the single separator that follows it is parsed as
/// the row count, ignoring surrounding whitespace and one trailing `;`. The
/// match is a plain substring search, so a column named `speed_limit` counts
/// too. A candidate that is not an integer is an error, not a fallback.
pub fn infer_limit(sql: &str, explicit: Option<usize>) -> DbResult<usize> {
    if let Some(limit) = explicit {
        return Ok(limit);
    }

    let lower = sql.to_ascii_lowercase();
    let Some(idx) = lower.find(KEYWORD) else {
        return Ok(DEFAULT_DISPLAY_LIMIT);
    };

    let after = &sql[idx + KEYWORD.len()..];
    let mut chars = after.chars();
    chars.next();
    let candidate = chars.as_str().trim();
    let candidate = candidate.strip_suffix(';').unwrap_or(candidate).trim_end();

    candidate
        .parse::<usize>()
        .map_err(|_| DbError::limit_parse(candidate))
}
