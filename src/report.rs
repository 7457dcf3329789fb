//! Completion table rendering and README splicing.
//!
//! Pure formatting; the caller gathers stats and owns file I/O.

use thiserror::Error;

use crate::calendar::Year;
use crate::completion::YearStats;

/// Sentinel pair the table is spliced between. Must appear exactly twice.
pub const TABLE_MARKER: &str = "<!-- INSERT COMPLETION TABLE -->";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportError {
    #[error("expected exactly two `{TABLE_MARKER}` markers, found {found}")]
    MarkerCount { found: usize },
}

/// Render the per-year stats as a markdown table.
pub fn render_table(stats: &[(Year, YearStats)]) -> String {
    let mut rows = vec![
        "| Year | Earned ⭐️ | Possible ⭐️ | Complete |".to_string(),
        "|------|-----------|-------------|----------|".to_string(),
    ];
    for (year, s) in stats {
        rows.push(format!(
            "| {year} | {} | {} | {}% |",
            s.earned,
            s.possible,
            s.percent()
        ));
    }
    rows.join("\n")
}

/// Splice the rendered table between the two markers in `document`.
///
/// Fewer or more than two markers is a configuration error in the
/// document itself; it is reported, never auto-corrected.
pub fn splice(document: &str, table: &str) -> Result<String, ReportError> {
    let parts: Vec<&str> = document.split(TABLE_MARKER).collect();
    if parts.len() != 3 {
        return Err(ReportError::MarkerCount {
            found: parts.len() - 1,
        });
    }
    Ok(format!(
        "{}{TABLE_MARKER}\n{table}\n{TABLE_MARKER}{}",
        parts[0], parts[2]
    ))
}
