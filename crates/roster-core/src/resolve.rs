//! Status resolution for one (person, item) pair.
//!
//! The current assignment always wins over history. History is consulted only
//! when there is no current assignment at all; an outstanding assignment hides
//! an older completion of the same item.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M:%S%.f",
];

/// `100000000` is March 1973; anything shorter is a year or a date, not
/// epoch seconds.
const MIN_EPOCH_DIGITS: usize = 9;

// ─── Completion fact ─────────────────────────────────────────────────────────

/// The part of an assignment or history record that resolution looks at.
/// The source offset is kept so the displayed date is the local one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionFact {
  pub completed_at: Option<DateTime<FixedOffset>>,
}

impl CompletionFact {
  pub fn completed(at: impl Into<DateTime<FixedOffset>>) -> Self {
    Self { completed_at: Some(at.into()) }
  }

  pub fn outstanding() -> Self { Self { completed_at: None } }

  /// Build from an unparsed source timestamp. Unparseable values are treated
  /// as absent.
  pub fn from_raw(raw: Option<&str>) -> Self {
    Self { completed_at: raw.and_then(parse_timestamp) }
  }
}

/// Parse a completion timestamp in any of the accepted source formats:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff]±HH[:MM]`, `YYYY-MM-DD[ T]HH:MM:SS[.fff]`
/// (taken as UTC), a bare date, or integer Unix seconds of at least nine
/// digits. Short integers such as `2024` are not timestamps.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt);
  }
  for format in OFFSET_FORMATS {
    if let Ok(dt) = DateTime::parse_from_str(raw, format) {
      return Some(dt);
    }
  }
  for format in NAIVE_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(naive.and_utc().fixed_offset());
    }
  }
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc().fixed_offset());
  }
  if raw.len() < MIN_EPOCH_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  raw
    .parse::<i64>()
    .ok()
    .and_then(|secs| DateTime::from_timestamp(secs, 0))
    .map(|dt| dt.fixed_offset())
}

// ─── Resolved cell ───────────────────────────────────────────────────────────

/// The terminal status of one matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum ResolvedCell {
  /// The current assignment was completed on this date.
  Complete(NaiveDate),
  /// The current assignment is outstanding.
  Incomplete,
  /// No current assignment; completed on this date in a previous context.
  Historical(NaiveDate),
  Unassigned,
}

/// Resolve a cell from its (possibly absent) current and historical records.
pub fn resolve(
  current: Option<&CompletionFact>,
  historical: Option<&CompletionFact>,
) -> ResolvedCell {
  match (current, historical) {
    (Some(CompletionFact { completed_at: Some(at) }), _) => {
      ResolvedCell::Complete(at.date_naive())
    }
    (Some(_), _) => ResolvedCell::Incomplete,
    (None, Some(CompletionFact { completed_at: Some(at) })) => {
      ResolvedCell::Historical(at.date_naive())
    }
    (None, _) => ResolvedCell::Unassigned,
  }
}
