//! Telemetry Port - Per-Cycle Observability Interface
//!
//! The scheduler reports the outcome of every scan cycle here so that
//! metrics exporters stay outside the use-case layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts collected during one completed scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleSummary {
  /// When the cycle started (UTC).
  pub started_at: DateTime<Utc>,
  /// Raw odds records received.
  pub odds_received: usize,
  /// Raw stats records received.
  pub stats_received: usize,
  /// Odds records dropped as malformed.
  pub odds_dropped: usize,
  /// Stats records dropped as malformed.
  pub stats_dropped: usize,
  /// Whether the odds source failed this cycle.
  pub odds_unavailable: bool,
  /// Whether the stats source failed this cycle.
  pub stats_unavailable: bool,
  /// Matches present in both sources.
  pub aligned: usize,
  /// Value bets emitted.
  pub value_bets: usize,
  /// Whether the notifier accepted the bets (true when there were none).
  pub delivered: bool,
  /// Wall-clock duration of the cycle in seconds.
  pub duration_secs: f64,
}

/// Receives cycle outcomes.
pub trait CycleObserver: Send + Sync + 'static {
  /// A cycle ran to completion.
  fn cycle_completed(&self, summary: &CycleSummary);

  /// A cycle was aborted with no alerts emitted.
  fn cycle_failed(&self, reason: &str, duration_secs: f64);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CycleObserver for NoopObserver {
  fn cycle_completed(&self, _summary: &CycleSummary) {}

  fn cycle_failed(&self, _reason: &str, _duration_secs: f64) {}
}
