//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No usable matrix: nothing fetched yet, or the last cycle failed.
  #[error("matrix unavailable: {0}")]
  Unavailable(String),

  #[error(transparent)]
  Refresh(#[from] roster_refresh::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = match &self {
      ApiError::Unavailable(m) => m.clone(),
      ApiError::Refresh(e) => e.to_string(),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": message }))).into_response()
  }
}
