//! The `TrainingSource` trait: read access to the five logical sources.
//!
//! Implemented by storage backends (e.g. `roster-store-sqlite`). The refresh
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::entity::{AssignmentRow, ItemRow, PersonRow};

/// The five logical sources read each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
  People,
  Modules,
  Documents,
  CurrentAssignments,
  HistoricalCompletions,
}

impl SourceKind {
  /// A failed required source fails the whole cycle. The optional history
  /// source degrades to an empty set instead.
  pub fn is_required(self) -> bool { !matches!(self, Self::HistoricalCompletions) }
}

/// Read-only access to the training data. Rows are returned in a
/// deterministic source order; positional fallback keys depend on it.
///
/// All methods return `Send` futures so the refresh driver can run on a
/// multi-threaded runtime.
pub trait TrainingSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn people(&self) -> impl Future<Output = Result<Vec<PersonRow>, Self::Error>> + Send + '_;

  fn modules(&self) -> impl Future<Output = Result<Vec<ItemRow>, Self::Error>> + Send + '_;

  fn documents(&self) -> impl Future<Output = Result<Vec<ItemRow>, Self::Error>> + Send + '_;

  fn current_assignments(
    &self,
  ) -> impl Future<Output = Result<Vec<AssignmentRow>, Self::Error>> + Send + '_;

  /// Completions preserved from earlier roles or assignment sets. May not be
  /// provisioned in every deployment.
  fn historical_completions(
    &self,
  ) -> impl Future<Output = Result<Vec<AssignmentRow>, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_history_is_optional() {
    assert!(SourceKind::People.is_required());
    assert!(SourceKind::CurrentAssignments.is_required());
    assert!(!SourceKind::HistoricalCompletions.is_required());
    assert_eq!(SourceKind::HistoricalCompletions.to_string(), "historical_completions");
  }
}
