//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown item kind: {0:?}")]
  UnknownItemKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
