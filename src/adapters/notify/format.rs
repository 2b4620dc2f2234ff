//! Alert message formatting.

use crate::domain::detector::ValueBet;

/// Plain-text alert for one value bet.
pub fn format_alert(bet: &ValueBet) -> String {
    format!(
        "⚡ Value Bet Detected!\n\
         🏆 {}\n\
         💰 Odd: {:.2}\n\
         📊 Edge: +{:.1}%",
        bet.match_label, bet.odds, bet.edge_pct
    )
}
