//! Handler for `GET /status`.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use roster_core::{DataQuality, MatrixFilter};
use roster_refresh::{RefreshConfig, RefreshState};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Status {
  pub state:        RefreshState,
  pub last_updated: Option<DateTime<Utc>>,
  pub error:        Option<String>,
  /// Findings from the last successful cycle.
  pub quality:      Option<DataQuality>,
  pub config:       RefreshConfig,
  pub filter:       MatrixFilter,
}

/// `GET /status`
pub async fn handler(State(state): State<AppState>) -> Json<Status> {
  let snapshot = state.refresh.snapshot();
  Json(Status {
    state:        snapshot.state,
    last_updated: snapshot.last_updated,
    error:        snapshot.error.clone(),
    quality:      snapshot.dataset.as_ref().map(|d| d.quality),
    config:       snapshot.config,
    filter:       snapshot.filter.clone(),
  })
}
