//! Log-only notifier for dry runs and unconfigured deployments.

use async_trait::async_trait;
use tracing::info;

use crate::domain::detector::ValueBet;
use crate::ports::notifier::AlertNotifier;

use super::format::format_alert;

/// Writes every alert to the structured log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl AlertNotifier for LogNotifier {
    async fn notify(&self, bets: &[ValueBet]) -> anyhow::Result<()> {
        for (rank, bet) in bets.iter().enumerate() {
            info!(
                rank = rank + 1,
                match_label = %bet.match_label,
                alert = %format_alert(bet),
                "Alert (not sent)"
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
