//! Tabular export of a [`Matrix`].
//!
//! One header row (`Name` plus each column title) and one row per person.
//! Cells render as empty (unassigned), [`INCOMPLETE_MARKER`], a `YYYY-MM-DD`
//! date (complete), or [`HISTORICAL_PREFIX`] followed by the date.

use std::borrow::Cow;

use crate::{matrix::Matrix, resolve::ResolvedCell};

pub const INCOMPLETE_MARKER: &str = "Incomplete";
pub const HISTORICAL_PREFIX: &str = "Historical: ";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn render_cell(cell: &ResolvedCell) -> Cow<'static, str> {
  match cell {
    ResolvedCell::Unassigned => Cow::Borrowed(""),
    ResolvedCell::Incomplete => Cow::Borrowed(INCOMPLETE_MARKER),
    ResolvedCell::Complete(date) => Cow::Owned(date.format(DATE_FORMAT).to_string()),
    ResolvedCell::Historical(date) => {
      Cow::Owned(format!("{HISTORICAL_PREFIX}{}", date.format(DATE_FORMAT)))
    }
  }
}

/// Flatten the matrix into text records, header first.
pub fn records(matrix: &Matrix) -> Vec<Vec<String>> {
  let header = std::iter::once("Name".to_owned())
    .chain(matrix.columns().iter().map(|c| c.title.clone()))
    .collect();

  std::iter::once(header)
    .chain(matrix.rows().iter().map(|row| {
      std::iter::once(row.name.clone())
        .chain(row.cells.iter().map(|c| render_cell(c).into_owned()))
        .collect()
    }))
    .collect()
}

/// Render the matrix as RFC 4180 CSV with CRLF line endings.
pub fn to_csv(matrix: &Matrix) -> String {
  let mut out = String::new();
  for record in records(matrix) {
    let line = record
      .iter()
      .map(|field| escape_field(field))
      .collect::<Vec<_>>()
      .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
  }
  out
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> Cow<'_, str> {
  if field.contains([',', '"', '\r', '\n']) {
    Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
  } else {
    Cow::Borrowed(field)
  }
}
