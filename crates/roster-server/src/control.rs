//! Handlers that steer the refresh task.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/refresh` | 202; supersedes a fetch in flight |
//! | `PUT`  | `/settings` | Body: `{"auto_refresh":true,"interval":"1m"}` |
//! | `PUT`  | `/filter` | Body: `{"department":"D1"}`; absent fields clear |

use axum::{Json, extract::State, http::StatusCode};
use roster_core::MatrixFilter;
use roster_refresh::RefreshConfig;

use crate::{AppState, error::ApiError};

/// `POST /refresh`
pub async fn refresh(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
  state.refresh.refresh()?;
  Ok(StatusCode::ACCEPTED)
}

/// `PUT /settings`
pub async fn settings(
  State(state): State<AppState>,
  Json(config): Json<RefreshConfig>,
) -> Result<StatusCode, ApiError> {
  state.refresh.configure(config)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /filter`
pub async fn filter(
  State(state): State<AppState>,
  Json(filter): Json<MatrixFilter>,
) -> Result<StatusCode, ApiError> {
  state.refresh.set_filter(filter)?;
  Ok(StatusCode::NO_CONTENT)
}
