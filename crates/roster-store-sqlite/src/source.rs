//! The SQLite implementation of [`TrainingSource`].

use std::path::Path;

use roster_core::{
  entity::{AssignmentRow, ItemRow, PersonRow},
  source::TrainingSource,
};
use rusqlite::{OpenFlags, Row};

use crate::{
  Error, Result,
  decode::{assignment_row, item_row, person_row},
  schema::Provision,
};

// ─── Source ──────────────────────────────────────────────────────────────────

/// Training sources backed by a single SQLite file.
///
/// Cloning shares the inner connection.
#[derive(Clone)]
pub struct SqliteSource {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSource {
  /// Open an existing database at `path` read-only.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Ok(Self { conn })
  }

  /// Open an empty in-memory database for tests and local seeding.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Create the source tables. Only meaningful on a writable database.
  pub async fn provision(&self, tables: Provision) -> Result<()> {
    self.seed(tables.ddl()).await
  }

  /// Execute a batch of SQL statements, e.g. fixture inserts.
  pub async fn seed(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` and decode every row with `decode`, in query order.
  async fn query<T, F>(&self, table: &'static str, sql: &'static str, decode: F) -> Result<Vec<T>>
  where
    T: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| decode(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(|e| Error::from_query(table, e))
  }
}

// ─── TrainingSource impl ─────────────────────────────────────────────────────

impl TrainingSource for SqliteSource {
  type Error = Error;

  async fn people(&self) -> Result<Vec<PersonRow>> {
    self
      .query(
        "people",
        "SELECT id, first_name, last_name, department_id, role_id
         FROM people ORDER BY rowid",
        person_row,
      )
      .await
  }

  async fn modules(&self) -> Result<Vec<ItemRow>> {
    self
      .query(
        "training_modules",
        "SELECT id, title FROM training_modules ORDER BY rowid",
        item_row,
      )
      .await
  }

  async fn documents(&self) -> Result<Vec<ItemRow>> {
    self
      .query("documents", "SELECT id, title FROM documents ORDER BY rowid", item_row)
      .await
  }

  async fn current_assignments(&self) -> Result<Vec<AssignmentRow>> {
    self
      .query(
        "training_assignments",
        "SELECT user_id, item_id, item_type, completed_at
         FROM training_assignments ORDER BY rowid",
        assignment_row,
      )
      .await
  }

  async fn historical_completions(&self) -> Result<Vec<AssignmentRow>> {
    self
      .query(
        "training_history",
        "SELECT user_id, item_id, item_type, completed_at
         FROM training_history ORDER BY rowid",
        assignment_row,
      )
      .await
  }
}
