//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The queried table does not exist in this database.
  #[error("table not found: {0}")]
  MissingTable(&'static str),
}

impl Error {
  /// Classify a query failure, singling out "no such table".
  pub(crate) fn from_query(table: &'static str, err: tokio_rusqlite::Error) -> Self {
    match &err {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(_, Some(msg)))
        if msg.starts_with("no such table") =>
      {
        Self::MissingTable(table)
      }
      _ => Self::Database(err),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
