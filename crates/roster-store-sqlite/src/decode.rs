//! Decoding helpers from loosely typed SQLite values to source rows.
//!
//! Identifier and timestamp columns may hold INTEGER, TEXT, or NULL depending
//! on how the database was populated; all of them are read as optional text.

use roster_core::entity::{AssignmentRow, ItemRow, PersonRow};
use rusqlite::{Row, types::Value};

/// Read column `idx` as text, whatever its storage class. NULL and BLOB read
/// as `None`.
pub fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
  Ok(match row.get::<_, Value>(idx)? {
    Value::Null | Value::Blob(_) => None,
    Value::Integer(i) => Some(i.to_string()),
    Value::Real(r) => Some(r.to_string()),
    Value::Text(s) => Some(s),
  })
}

pub fn person_row(row: &Row<'_>) -> rusqlite::Result<PersonRow> {
  Ok(PersonRow {
    id:            text(row, 0)?,
    first_name:    text(row, 1)?,
    last_name:     text(row, 2)?,
    department_id: text(row, 3)?,
    role_id:       text(row, 4)?,
  })
}

pub fn item_row(row: &Row<'_>) -> rusqlite::Result<ItemRow> {
  Ok(ItemRow { id: text(row, 0)?, title: text(row, 1)? })
}

pub fn assignment_row(row: &Row<'_>) -> rusqlite::Result<AssignmentRow> {
  Ok(AssignmentRow {
    person_id:    text(row, 0)?,
    item_id:      text(row, 1)?,
    item_type:    text(row, 2)?,
    completed_at: text(row, 3)?,
  })
}
