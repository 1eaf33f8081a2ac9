//! SQL schema of the training sources.
//!
//! The engine only reads these tables; the DDL here provisions empty
//! databases for tests and local demos. Identifier columns are nullable on
//! purpose: source data is not guaranteed to carry them.

/// Required tables; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const CORE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS people (
    id            INTEGER,
    first_name    TEXT,
    last_name     TEXT,
    department_id INTEGER,
    role_id       INTEGER
);

CREATE TABLE IF NOT EXISTS training_modules (
    id    INTEGER,
    title TEXT
);

CREATE TABLE IF NOT EXISTS documents (
    id    INTEGER,
    title TEXT
);

-- Active assignments; completed_at NULL means outstanding.
CREATE TABLE IF NOT EXISTS training_assignments (
    user_id      INTEGER,
    item_id      INTEGER,
    item_type    TEXT,     -- 'module' | 'document'
    completed_at TEXT
);
";

/// Optional archive of completions from earlier roles or assignment sets.
pub const HISTORY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS training_history (
    user_id      INTEGER,
    item_id      INTEGER,
    item_type    TEXT,
    completed_at TEXT
);
";

/// Which tables [`crate::SqliteSource::provision`] creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provision {
  /// People, both catalogs and current assignments.
  Core,
  /// Everything in [`Provision::Core`] plus the history archive.
  WithHistory,
}

impl Provision {
  pub(crate) fn ddl(self) -> String {
    match self {
      Self::Core => CORE_SCHEMA.to_owned(),
      Self::WithHistory => format!("{CORE_SCHEMA}{HISTORY_SCHEMA}"),
    }
  }
}
