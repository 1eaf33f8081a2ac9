//! The externally configurable refresh parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Polling period. Only these values are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefreshInterval {
  #[serde(rename = "10s")]
  TenSeconds,
  #[default]
  #[serde(rename = "30s")]
  ThirtySeconds,
  #[serde(rename = "1m")]
  OneMinute,
  #[serde(rename = "5m")]
  FiveMinutes,
}

impl RefreshInterval {
  pub fn period(self) -> Duration {
    match self {
      Self::TenSeconds => Duration::from_secs(10),
      Self::ThirtySeconds => Duration::from_secs(30),
      Self::OneMinute => Duration::from_secs(60),
      Self::FiveMinutes => Duration::from_secs(300),
    }
  }
}

/// Auto-refresh switch and period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
  #[serde(default = "default_auto_refresh")]
  pub auto_refresh: bool,
  #[serde(default)]
  pub interval:     RefreshInterval,
}

fn default_auto_refresh() -> bool { true }

impl Default for RefreshConfig {
  fn default() -> Self {
    Self { auto_refresh: default_auto_refresh(), interval: RefreshInterval::default() }
  }
}
