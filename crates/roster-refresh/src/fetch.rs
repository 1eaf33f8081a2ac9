//! One fetch cycle: fan out to all five sources, fan back in.
//!
//! All five queries run concurrently and the result is only assembled once
//! every one of them has settled, so a dataset never mixes rows from two
//! different cycles.

use std::time::Duration;

use roster_core::{
  RawDataset,
  source::{SourceKind, TrainingSource},
};
use tracing::info;

use crate::{Error, Result};

/// Read every source and assemble the raw dataset.
///
/// A failure on a required source fails the cycle. The history source may be
/// missing or broken in some deployments; its failure is logged and read as
/// an empty set.
pub async fn fetch_all<S: TrainingSource>(source: &S) -> Result<RawDataset> {
  let (people, modules, documents, current, historical) = tokio::join!(
    source.people(),
    source.modules(),
    source.documents(),
    source.current_assignments(),
    source.historical_completions(),
  );

  let historical = historical.unwrap_or_else(|e| {
    info!(error = %e, "historical completions unavailable; treating as empty");
    Vec::new()
  });

  Ok(RawDataset {
    people: required(SourceKind::People, people)?,
    modules: required(SourceKind::Modules, modules)?,
    documents: required(SourceKind::Documents, documents)?,
    current: required(SourceKind::CurrentAssignments, current)?,
    historical,
  })
}

/// [`fetch_all`] with an optional deadline; expiry is an ordinary failure.
pub async fn fetch_with_timeout<S: TrainingSource>(
  source: &S,
  timeout: Option<Duration>,
) -> Result<RawDataset> {
  match timeout {
    Some(limit) => tokio::time::timeout(limit, fetch_all(source))
      .await
      .map_err(|_| Error::Timeout(limit))?,
    None => fetch_all(source).await,
  }
}

fn required<T, E>(kind: SourceKind, result: Result<T, E>) -> Result<T>
where
  E: std::error::Error + Send + Sync + 'static,
{
  result.map_err(|e| Error::Source { kind, error: Box::new(e) })
}
