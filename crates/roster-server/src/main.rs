//! roster-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! training database read-only, starts the refresh task, and serves the
//! matrix over HTTP.
//!
//! # One-shot export
//!
//! ```
//! roster-server --config roster.toml --once > matrix.csv
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use roster_core::export;
use roster_refresh::RefreshOptions;
use roster_server::{AppState, ServerConfig};
use roster_store_sqlite::SqliteSource;
use tokio::{net::TcpListener, signal};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Training compliance matrix server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Fetch once, print the matrix as CSV to stdout, and exit.
  #[arg(long)]
  once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROSTER").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let database_path = expand_tilde(&server_cfg.database_path);
  let source = SqliteSource::open(&database_path)
    .await
    .with_context(|| format!("failed to open database at {database_path:?}"))?;

  let refresh = roster_refresh::spawn(Arc::new(source), RefreshOptions {
    config:           server_cfg.refresh(),
    filter:           Default::default(),
    fetch_timeout:    server_cfg.fetch_timeout(),
    refresh_on_start: true,
  });

  if cli.once {
    let snapshot = refresh.settled().await?;
    refresh.shutdown().await;
    if let Some(e) = &snapshot.error {
      anyhow::bail!("refresh failed: {e}");
    }
    let matrix = snapshot.matrix.as_deref().context("no matrix was published")?;
    print!("{}", export::to_csv(matrix));
    return Ok(());
  }

  let state = AppState { refresh: Arc::new(refresh) };
  let app = roster_server::router(state.clone());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  match Arc::try_unwrap(state.refresh) {
    Ok(handle) => handle.shutdown().await,
    Err(_) => warn!("refresh task still referenced at exit"),
  }
  info!("Server shutdown complete");
  Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      warn!(error = %e, "failed to listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        warn!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
    _ = terminate => info!("Received terminate signal, shutting down"),
  }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
