//! ASCII table rendering for query results.
//!
//! Output looks like the MySQL command-line client:
//!
//! ```text
//! +----+------+-------+
//! | id | name | score |
//! +----+------+-------+
//! | 1  | Ann  |  9.5  |
//! | 2  |  Bo  | NULL  |
//! +----+------+-------+
//! 2 rows returned in time: (0.004 sec)
//! ```
//!
//! Every cell, header included, is centered in its column.

use crate::error::{DbError, DbResult};
use crate::models::query::format_secs;
use crate::models::{QueryOutcome, Row};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

/// What a render call printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub total_rows: usize,
    pub rows_printed: usize,
    /// Whether the truncation notice was printed
    pub truncated: bool,
}

/// Center `text` in `width` display columns; odd padding puts the extra
/// space on the right.
fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
}

fn border(widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("+{}+", segments.join("+"))
}

fn line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let segments: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!(" {} ", center(cell.as_ref(), *w)))
        .collect();
    format!("|{}|", segments.join("|"))
}

/// Width of every column: the widest of its header and all of its cells.
pub fn column_widths(columns: &[String], cells: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }
    widths
}

/// `"1 row returned"`, `"3 rows returned"`
pub fn rows_returned(count: usize) -> String {
    let noun = if count == 1 { "row" } else { "rows" };
    format!("{count} {noun} returned")
}

/// Render a result set into `out`.
///
/// Every row must have one value per column; this is checked before anything
/// is written. At most `display_limit` rows are printed. The truncation
/// notice appears only when more rows exist than were printed.
pub fn render_table<W: Write + ?Sized>(
    out: &mut W,
    columns: &[String],
    rows: &[Row],
    elapsed: Duration,
    display_limit: usize,
) -> DbResult<RenderSummary> {
    if let Some((idx, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns.len())
    {
        return Err(DbError::row_arity(idx, columns.len(), row.len()));
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let widths = column_widths(columns, &cells);
    let separator = border(&widths);

    writeln!(out, "{separator}")?;
    writeln!(out, "{}", line(columns, &widths))?;
    writeln!(out, "{separator}")?;

    let rows_printed = cells.len().min(display_limit);
    for row in &cells[..rows_printed] {
        writeln!(out, "{}", line(row, &widths))?;
    }
    writeln!(out, "{separator}")?;

    let total_rows = cells.len();
    let truncated = total_rows > display_limit && total_rows != display_limit;
    if truncated {
        warn!(
            total_rows,
            display_limit, "Result truncated to the display limit"
        );
        writeln!(
            out,
            "!!!Result Truncated. Showing only {display_limit} results!!!"
        )?;
    }

    writeln!(
        out,
        "{} in time: ({} sec)",
        rows_returned(total_rows),
        format_secs(elapsed)
    )?;
    writeln!(out, "\n")?;
    out.flush()?;

    Ok(RenderSummary {
        total_rows,
        rows_printed,
        truncated,
    })
}

/// Render a query outcome into `out`.
pub fn render_outcome<W: Write + ?Sized>(
    out: &mut W,
    outcome: &QueryOutcome,
    display_limit: usize,
) -> DbResult<RenderSummary> {
    render_table(
        out,
        &outcome.columns,
        &outcome.rows,
        outcome.elapsed,
        display_limit,
    )
}

/// Render a result set to standard output.
pub fn print_table(
    columns: &[String],
    rows: &[Row],
    elapsed: Duration,
    display_limit: usize,
) -> DbResult<RenderSummary> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    render_table(&mut handle, columns, rows, elapsed, display_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn render(columns: &[&str], rows: &[Row], limit: usize) -> (String, RenderSummary) {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut out = Vec::new();
        let summary =
            render_table(&mut out, &columns, rows, Duration::from_millis(12), limit).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_center_matches_std_alignment() {
        assert_eq!(center("ab", 5), format!("{:^5}", "ab"));
        assert_eq!(center("abc", 6), format!("{:^6}", "abc"));
        assert_eq!(center("abc", 3), "abc");
    }

    #[test]
    fn test_basic_table() {
        let rows = vec![
            vec![Value::Int(1), Value::from("Ann"), Value::Float(9.5)],
            vec![Value::Int(2), Value::from("Bo"), Value::Null],
        ];
        let (text, summary) = render(&["id", "name", "score"], &rows, 50);
        let expected = "\
+----+------+-------+
| id | name | score |
+----+------+-------+
| 1  | Ann  |  9.5  |
| 2  |  Bo  | NULL  |
+----+------+-------+
2 rows returned in time: (0.012 sec)


";
        assert_eq!(text, expected);
        assert_eq!(
            summary,
            RenderSummary {
                total_rows: 2,
                rows_printed: 2,
                truncated: false
            }
        );
    }

    #[test]
    fn test_truncation_notice() {
        let rows: Vec<Row> = (1..=3).map(|i| vec![Value::Int(i)]).collect();
        let (text, summary) = render(&["n"], &rows, 1);
        assert_eq!(summary.rows_printed, 1);
        assert!(summary.truncated);
        assert!(text.contains("!!!Result Truncated. Showing only 1 results!!!"));
        assert!(text.contains("3 rows returned"));
        assert!(!text.contains("| 2 |"));
    }

    #[test]
    fn test_exact_limit_is_not_truncated() {
        let rows: Vec<Row> = (1..=3).map(|i| vec![Value::Int(i)]).collect();
        let (text, summary) = render(&["n"], &rows, 3);
        assert_eq!(summary.rows_printed, 3);
        assert!(!summary.truncated);
        assert!(!text.contains("Truncated"));
    }

    #[test]
    fn test_singular_summary() {
        let (text, _) = render(&["n"], &[vec![Value::Int(1)]], 50);
        assert!(text.contains("1 row returned in time"));
    }

    #[test]
    fn test_empty_result() {
        let (text, summary) = render(&["a", "bb"], &[], 50);
        assert_eq!(summary.total_rows, 0);
        assert!(text.starts_with("+---+----+\n| a | bb |\n+---+----+\n+---+----+\n"));
        assert!(text.contains("0 rows returned"));
    }

    #[test]
    fn test_wide_characters_align() {
        let rows = vec![vec![Value::from("日本")]];
        let (text, _) = render(&["x"], &rows, 50);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "+------+");
        assert_eq!(lines[3], "| 日本 |");
    }

    #[test]
    fn test_short_row_is_rejected_before_output() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(3)]];
        let mut out = Vec::new();
        let err = render_table(&mut out, &columns, &rows, Duration::ZERO, 50).unwrap_err();
        assert!(matches!(
            err,
            DbError::RowArity {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_rows_returned() {
        assert_eq!(rows_returned(0), "0 rows returned");
        assert_eq!(rows_returned(1), "1 row returned");
    }
}
