//! Drives a [`RefreshMachine`] on a tokio task.
//!
//! The task owns the machine outright. Everything else talks to it through a
//! [`RefreshHandle`]: commands go in over an unbounded channel and snapshots
//! come out over a `watch` channel.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use chrono::Utc;
use roster_core::{MatrixFilter, RawDataset, source::TrainingSource};
use tokio::{
  sync::{mpsc, watch},
  task::JoinHandle,
  time::{Instant, Interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
  Error, RefreshConfig, RefreshInterval, Result,
  fetch::fetch_with_timeout,
  machine::{FetchTicket, RefreshMachine, RefreshState, Snapshot},
};

/// Start-up parameters for [`spawn`].
#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
  pub config:           RefreshConfig,
  pub filter:           MatrixFilter,
  /// Deadline for one whole fetch cycle. `None` waits indefinitely.
  pub fetch_timeout:    Option<Duration>,
  /// Start a fetch immediately instead of waiting for the first tick.
  pub refresh_on_start: bool,
}

enum Command {
  Refresh,
  SetFilter(MatrixFilter),
  Configure(RefreshConfig),
}

type FetchFuture = Pin<Box<dyn Future<Output = Result<RawDataset>> + Send>>;

/// Spawn the refresh task for `source`. Must be called within a tokio
/// runtime.
pub fn spawn<S>(source: Arc<S>, options: RefreshOptions) -> RefreshHandle
where
  S: TrainingSource + 'static,
{
  let machine = RefreshMachine::new(options.config, options.filter.clone());
  let (publish, snapshots) = watch::channel(machine.snapshot());
  let (commands_tx, commands) = mpsc::unbounded_channel();
  let cancel = CancellationToken::new();

  let task = tokio::spawn(run(Driver {
    source,
    machine,
    commands,
    publish,
    cancel: cancel.clone(),
    fetch_timeout: options.fetch_timeout,
    refresh_on_start: options.refresh_on_start,
  }));

  RefreshHandle { commands: commands_tx, snapshots, cancel, task: Some(task) }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Owner-side access to a running refresh task. Dropping the handle stops
/// the task.
pub struct RefreshHandle {
  commands:  mpsc::UnboundedSender<Command>,
  snapshots: watch::Receiver<Arc<Snapshot>>,
  cancel:    CancellationToken,
  task:      Option<JoinHandle<()>>,
}

impl RefreshHandle {
  /// The latest published snapshot.
  pub fn snapshot(&self) -> Arc<Snapshot> { self.snapshots.borrow().clone() }

  /// A receiver notified on every published snapshot.
  pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> { self.snapshots.clone() }

  /// Fetch now, superseding any fetch in flight.
  pub fn refresh(&self) -> Result<()> { self.send(Command::Refresh) }

  /// Change the row filter. The matrix is rebuilt from cached data.
  pub fn set_filter(&self, filter: MatrixFilter) -> Result<()> {
    self.send(Command::SetFilter(filter))
  }

  /// Change the auto-refresh switch or interval. A new interval, or turning
  /// auto-refresh back on, restarts the timer.
  pub fn configure(&self, config: RefreshConfig) -> Result<()> {
    self.send(Command::Configure(config))
  }

  /// Wait until the first cycle has finished, successfully or not, and
  /// nothing is in flight.
  pub async fn settled(&self) -> Result<Arc<Snapshot>> {
    let mut snapshots = self.snapshots.clone();
    let snapshot = snapshots
      .wait_for(|s| {
        s.state != RefreshState::Fetching && (s.last_updated.is_some() || s.error.is_some())
      })
      .await
      .map_err(|_| Error::ShutDown)?
      .clone();
    Ok(snapshot)
  }

  /// Stop the task and wait for it to exit. A fetch still in flight is
  /// abandoned and its result never published.
  pub async fn shutdown(mut self) {
    self.cancel.cancel();
    if let Some(task) = self.task.take()
      && let Err(e) = task.await
    {
      warn!(error = %e, "refresh task ended abnormally");
    }
  }

  fn send(&self, command: Command) -> Result<()> {
    if self.cancel.is_cancelled() {
      return Err(Error::ShutDown);
    }
    self.commands.send(command).map_err(|_| Error::ShutDown)
  }
}

impl Drop for RefreshHandle {
  fn drop(&mut self) { self.cancel.cancel(); }
}

// ─── Task ────────────────────────────────────────────────────────────────────

struct Driver<S> {
  source:           Arc<S>,
  machine:          RefreshMachine,
  commands:         mpsc::UnboundedReceiver<Command>,
  publish:          watch::Sender<Arc<Snapshot>>,
  cancel:           CancellationToken,
  fetch_timeout:    Option<Duration>,
  refresh_on_start: bool,
}

impl<S: TrainingSource + 'static> Driver<S> {
  fn start(&self, ticket: Option<FetchTicket>) -> Option<(FetchTicket, FetchFuture)> {
    let ticket = ticket?;
    let source = Arc::clone(&self.source);
    let timeout = self.fetch_timeout;
    debug!(generation = ticket.generation(), "starting fetch");
    Some((ticket, Box::pin(async move { fetch_with_timeout(&*source, timeout).await })))
  }
}

async fn run<S: TrainingSource + 'static>(mut driver: Driver<S>) {
  let mut ticker = interval_ticker(driver.machine.config().interval);
  let mut in_flight = None;

  if driver.refresh_on_start {
    let ticket = driver.machine.request_refresh();
    in_flight = driver.start(ticket);
  }

  let mut published = driver.machine.snapshot();
  driver.publish.send_replace(Arc::clone(&published));
  info!(interval = ?driver.machine.config().interval, "refresh task started");

  loop {
    tokio::select! {
      biased;

      _ = driver.cancel.cancelled() => break,

      command = driver.commands.recv() => match command {
        // Every handle is gone.
        None => break,
        Some(Command::Refresh) => {
          let ticket = driver.machine.request_refresh();
          if let Some(next) = driver.start(ticket) {
            in_flight = Some(next);
          }
        }
        Some(Command::SetFilter(filter)) => driver.machine.set_filter(filter),
        Some(Command::Configure(config)) => {
          let previous = driver.machine.config();
          driver.machine.configure(config);
          let resumed = !previous.auto_refresh && config.auto_refresh;
          if resumed || previous.interval != config.interval {
            ticker = interval_ticker(config.interval);
          }
        }
      },

      (ticket, result) = settle(&mut in_flight) => {
        driver.machine.complete(ticket, result, Utc::now());
      }

      _ = ticker.tick() => {
        let ticket = driver.machine.tick();
        if let Some(next) = driver.start(ticket) {
          in_flight = Some(next);
        }
      }
    }

    let current = driver.machine.snapshot();
    if !Arc::ptr_eq(&current, &published) {
      driver.publish.send_replace(Arc::clone(&current));
      published = current;
    }
  }

  driver.machine.dispose();
  drop(in_flight);
  info!("refresh task stopped");
}

/// Resolves when the in-flight fetch finishes, clearing the slot. Pending
/// forever while the slot is empty.
async fn settle(slot: &mut Option<(FetchTicket, FetchFuture)>) -> (FetchTicket, Result<RawDataset>) {
  match slot {
    Some((ticket, fetch)) => {
      let result = fetch.await;
      let ticket = *ticket;
      *slot = None;
      (ticket, result)
    }
    None => std::future::pending().await,
  }
}

/// First tick one full period from now; ticks missed while the task was busy
/// are skipped rather than bunched up.
fn interval_ticker(interval: RefreshInterval) -> Interval {
  let period = interval.period();
  let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
  ticker
}
