//! Periodic re-fetch and rebuild of the training matrix.
//!
//! [`RefreshMachine`] is the single-owner state machine: it decides when a
//! fetch starts, whether a finished fetch is still wanted, and publishes each
//! outcome as a fresh immutable [`Snapshot`]. [`spawn`] drives a machine on a
//! tokio task, feeding it timer ticks, commands, and fetch results.

pub mod config;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod machine;

pub use config::{RefreshConfig, RefreshInterval};
pub use driver::{RefreshHandle, RefreshOptions, spawn};
pub use error::{Error, Result};
pub use machine::{Applied, FetchTicket, RefreshMachine, RefreshState, Snapshot};

#[cfg(test)]
mod fixture;
