//! Error types for `roster-refresh`.

use std::time::Duration;

use roster_core::source::SourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required source failed; the cycle is abandoned.
  #[error("failed to read {kind}: {error}")]
  Source {
    kind:   SourceKind,
    #[source]
    error:  Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("fetch timed out after {0:?}")]
  Timeout(Duration),

  /// The refresh task has been shut down.
  #[error("refresh task is shut down")]
  ShutDown,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
