//! Handlers for the matrix views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/matrix` | Optional `?name=&department=&role=`; 503 until a cycle succeeds |
//! | `GET`  | `/matrix.csv` | Same matrix, `text/csv` |
//!
//! Without query parameters the published matrix is returned as-is. With any
//! parameter, an ad-hoc matrix is built from the cached dataset; no fetch is
//! triggered either way.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use roster_core::{Matrix, MatrixFilter, export, matrix::MatrixSummary};
use serde::Serialize;

use crate::{AppState, error::ApiError};

#[derive(Serialize)]
struct MatrixBody<'a> {
  last_updated: Option<DateTime<Utc>>,
  filter:       &'a MatrixFilter,
  summary:      MatrixSummary,
  #[serde(flatten)]
  matrix:       &'a Matrix,
}

/// The matrix for `query`, or the published one when `query` is empty.
fn resolve_view(
  state: &AppState,
  query: MatrixFilter,
) -> Result<(Option<DateTime<Utc>>, MatrixFilter, Arc<Matrix>), ApiError> {
  let snapshot = state.refresh.snapshot();
  if let Some(e) = &snapshot.error {
    return Err(ApiError::Unavailable(e.clone()));
  }
  let (Some(dataset), Some(published)) = (&snapshot.dataset, &snapshot.matrix) else {
    return Err(ApiError::Unavailable("no data has been fetched yet".into()));
  };

  if query.is_empty() {
    Ok((snapshot.last_updated, snapshot.filter.clone(), Arc::clone(published)))
  } else {
    let matrix = Arc::new(dataset.materialize(&query));
    Ok((snapshot.last_updated, query, matrix))
  }
}

/// `GET /matrix[?name=...][&department=...][&role=...]`
pub async fn json(
  State(state): State<AppState>,
  Query(query): Query<MatrixFilter>,
) -> Result<Response, ApiError> {
  let (last_updated, filter, matrix) = resolve_view(&state, query)?;
  let body = MatrixBody {
    last_updated,
    filter: &filter,
    summary: matrix.summary(),
    matrix: &matrix,
  };
  Ok(Json(body).into_response())
}

/// `GET /matrix.csv[?name=...][&department=...][&role=...]`
pub async fn csv(
  State(state): State<AppState>,
  Query(query): Query<MatrixFilter>,
) -> Result<Response, ApiError> {
  let (_, _, matrix) = resolve_view(&state, query)?;
  Ok(
    (
      [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (header::CONTENT_DISPOSITION, "attachment; filename=\"training-matrix.csv\""),
      ],
      export::to_csv(&matrix),
    )
      .into_response(),
  )
}
