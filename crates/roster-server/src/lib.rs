//! HTTP surface for the training matrix.
//!
//! Exposes an axum [`Router`] over a running refresh task. Handlers only
//! read published snapshots or send commands; none of them fetch.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = roster_server::router(AppState { refresh: Arc::new(handle) });
//! ```

pub mod control;
pub mod error;
pub mod matrix;
pub mod status;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post, put},
};
use roster_refresh::{RefreshConfig, RefreshHandle, RefreshInterval};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub database_path:      PathBuf,
  #[serde(default = "default_auto_refresh")]
  pub auto_refresh:       bool,
  #[serde(default)]
  pub refresh_interval:   RefreshInterval,
  /// Deadline for one fetch cycle; unset waits indefinitely.
  #[serde(default)]
  pub fetch_timeout_secs: Option<u64>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_auto_refresh() -> bool { true }

impl ServerConfig {
  pub fn refresh(&self) -> RefreshConfig {
    RefreshConfig { auto_refresh: self.auto_refresh, interval: self.refresh_interval }
  }

  pub fn fetch_timeout(&self) -> Option<Duration> {
    self.fetch_timeout_secs.map(Duration::from_secs)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub refresh: Arc<RefreshHandle>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router with every endpoint under `/api`.
pub fn router(state: AppState) -> Router {
  let api = Router::new()
    .route("/matrix", get(matrix::json))
    .route("/matrix.csv", get(matrix::csv))
    .route("/status", get(status::handler))
    .route("/refresh", post(control::refresh))
    .route("/settings", put(control::settings))
    .route("/filter", put(control::filter))
    .with_state(state);

  Router::new().nest("/api", api).layer(TraceLayer::new_for_http())
}
