//! Alert Notifier Port - Downstream Value Bet Delivery
//!
//! The scanner's contract ends at handing over a ranked slice of
//! value bets. Delivery (and its failures) belong to the implementor;
//! failed deliveries are logged by the caller and never replayed.

use async_trait::async_trait;

use crate::domain::detector::ValueBet;

/// Sink for value bet alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync + 'static {
  /// Deliver the bets of one cycle, in the given order.
  ///
  /// Called only when at least one bet was detected.
  async fn notify(&self, bets: &[ValueBet]) -> anyhow::Result<()>;

  /// Notifier name for logs.
  fn name(&self) -> &str;
}
