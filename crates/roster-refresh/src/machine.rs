//! The refresh state machine.
//!
//! ```text
//! Idle ──tick / manual──▶ Fetching ──ok──▶ Idle
//!                            │
//!                            └──err──▶ Failed (previous matrix kept)
//! ```
//!
//! The machine owns the published [`Snapshot`] and replaces it wholesale on
//! every transition; readers holding an older `Arc<Snapshot>` never observe a
//! change. Each fetch is identified by a [`FetchTicket`]; only the ticket of
//! the latest fetch can apply a result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roster_core::{Dataset, Matrix, MatrixFilter, RawDataset};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{RefreshConfig, Result};

// ─── Published state ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
  Idle,
  Fetching,
  /// Idle after a failed cycle; `Snapshot::error` says why.
  Failed,
}

/// Everything a consumer may read, as of one transition.
#[derive(Debug, Clone)]
pub struct Snapshot {
  pub state:        RefreshState,
  pub config:       RefreshConfig,
  pub filter:       MatrixFilter,
  /// The last successfully fetched cycle; reused on filter changes.
  pub dataset:      Option<Arc<Dataset>>,
  /// `dataset` materialised with `filter`.
  pub matrix:       Option<Arc<Matrix>>,
  pub last_updated: Option<DateTime<Utc>>,
  /// Set by a failed cycle, cleared by the next successful one.
  pub error:        Option<String>,
}

// ─── Machine ─────────────────────────────────────────────────────────────────

/// Identifies one started fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
  generation: u64,
}

impl FetchTicket {
  pub fn generation(&self) -> u64 { self.generation }
}

/// What [`RefreshMachine::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
  Published,
  Failed,
  /// Superseded by a newer fetch, or the machine was disposed.
  Discarded,
}

pub struct RefreshMachine {
  generation: u64,
  in_flight:  Option<u64>,
  disposed:   bool,
  current:    Arc<Snapshot>,
}

impl RefreshMachine {
  pub fn new(config: RefreshConfig, filter: MatrixFilter) -> Self {
    Self {
      generation: 0,
      in_flight:  None,
      disposed:   false,
      current:    Arc::new(Snapshot {
        state: RefreshState::Idle,
        config,
        filter,
        dataset: None,
        matrix: None,
        last_updated: None,
        error: None,
      }),
    }
  }

  pub fn snapshot(&self) -> Arc<Snapshot> { Arc::clone(&self.current) }

  pub fn config(&self) -> RefreshConfig { self.current.config }

  pub fn is_fetching(&self) -> bool { self.in_flight.is_some() }

  pub fn is_disposed(&self) -> bool { self.disposed }

  // ── Triggers ──────────────────────────────────────────────────────────────

  /// A timer tick. Starts a fetch only when auto-refresh is on and nothing is
  /// in flight.
  pub fn tick(&mut self) -> Option<FetchTicket> {
    if self.disposed || !self.current.config.auto_refresh {
      return None;
    }
    if let Some(generation) = self.in_flight {
      debug!(generation, "tick ignored; fetch already in flight");
      return None;
    }
    Some(self.begin())
  }

  /// An explicit refresh. Always starts a fetch; one already in flight is
  /// superseded and its result will be discarded.
  pub fn request_refresh(&mut self) -> Option<FetchTicket> {
    if self.disposed {
      return None;
    }
    if let Some(generation) = self.in_flight {
      debug!(generation, "manual refresh supersedes in-flight fetch");
    }
    Some(self.begin())
  }

  fn begin(&mut self) -> FetchTicket {
    self.generation += 1;
    self.in_flight = Some(self.generation);
    self.publish(|s| s.state = RefreshState::Fetching);
    FetchTicket { generation: self.generation }
  }

  // ── Results ───────────────────────────────────────────────────────────────

  /// Apply the result of the fetch identified by `ticket`.
  pub fn complete(
    &mut self,
    ticket: FetchTicket,
    result: Result<RawDataset>,
    now: DateTime<Utc>,
  ) -> Applied {
    if self.disposed || self.in_flight != Some(ticket.generation) {
      debug!(generation = ticket.generation, "discarding stale fetch result");
      return Applied::Discarded;
    }
    self.in_flight = None;

    match result {
      Ok(raw) => {
        let dataset = Arc::new(Dataset::normalize(raw));
        let matrix = Arc::new(dataset.materialize(&self.current.filter));
        info!(
          generation = ticket.generation,
          rows = matrix.rows().len(),
          columns = matrix.columns().len(),
          "published training matrix"
        );
        self.publish(|s| {
          s.state = RefreshState::Idle;
          s.dataset = Some(dataset);
          s.matrix = Some(matrix);
          s.last_updated = Some(now);
          s.error = None;
        });
        Applied::Published
      }
      Err(e) => {
        warn!(generation = ticket.generation, error = %e, "refresh failed; keeping previous matrix");
        self.publish(|s| {
          s.state = RefreshState::Failed;
          s.error = Some(e.to_string());
        });
        Applied::Failed
      }
    }
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  /// Change the row filter and rebuild from the cached dataset, if any.
  /// Never triggers a fetch.
  pub fn set_filter(&mut self, filter: MatrixFilter) {
    if self.disposed {
      return;
    }
    let matrix = self
      .current
      .dataset
      .as_ref()
      .map(|d| Arc::new(d.materialize(&filter)));
    self.publish(|s| {
      s.filter = filter;
      if matrix.is_some() {
        s.matrix = matrix;
      }
    });
  }

  pub fn configure(&mut self, config: RefreshConfig) {
    if self.disposed || self.current.config == config {
      return;
    }
    info!(auto_refresh = config.auto_refresh, interval = ?config.interval, "refresh settings changed");
    self.publish(|s| s.config = config);
  }

  /// Tear down: no further fetches start and no result is applied.
  pub fn dispose(&mut self) {
    self.disposed = true;
    self.in_flight = None;
  }

  fn publish(&mut self, edit: impl FnOnce(&mut Snapshot)) {
    let mut next = Snapshot::clone(&self.current);
    edit(&mut next);
    self.current = Arc::new(next);
  }
}
