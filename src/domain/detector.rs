//! Value detection: model probability vs best market-implied probability.
//!
//! `edge = model_prob - max(1/p_home, 1/p_draw, 1/p_away)`. A match is
//! flagged when its edge strictly exceeds the configured threshold.
//! Bets come out sorted by edge, largest first.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::records::MatchRecord;

/// Market label for the only supported market.
pub const MARKET_1X2: &str = "1X2";

/// Default minimum edge (fraction, not percent).
pub const DEFAULT_VALUE_THRESHOLD: f64 = 0.15;

/// A match record with its model probability attached.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch<'a> {
    pub record: &'a MatchRecord,
    pub probability: f64,
}

/// Edge computation for one match, before thresholding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAssessment {
    pub model_probability: f64,
    pub best_market_probability: f64,
    pub edge: f64,
}

/// A flagged value bet, ready for the notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBet {
    /// Display label, e.g. `"Arsenal vs Chelsea"`.
    pub match_label: String,
    /// Market label, always `"1X2"`.
    pub market: String,
    /// Longest of the three prices, 2 decimals.
    ///
    /// Not necessarily the price of the outcome the model favours.
    pub odds: Decimal,
    /// Edge in percent, 1 decimal.
    pub edge_pct: Decimal,
    pub model_probability: f64,
    pub best_market_probability: f64,
}

/// Flags matches whose edge exceeds a fixed threshold.
#[derive(Debug, Clone, Copy)]
pub struct ValueDetector {
    threshold: f64,
}

impl Default for ValueDetector {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_THRESHOLD)
    }
}

impl ValueDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Edge of one match.
    pub fn assess(record: &MatchRecord, probability: f64) -> EdgeAssessment {
        let best = record.prices.best_implied();
        EdgeAssessment {
            model_probability: probability,
            best_market_probability: best,
            edge: probability - best,
        }
    }

    /// Emit a `ValueBet` for every match with `edge > threshold`.
    ///
    /// # Errors
    /// `InvalidProbability` if any model probability is NaN or outside
    /// [0, 1]; the whole batch is rejected in that case.
    pub fn detect(&self, scored: &[ScoredMatch<'_>]) -> Result<Vec<ValueBet>, DomainError> {
        let mut flagged: Vec<(f64, ValueBet)> = Vec::new();

        for item in scored {
            if !(0.0..=1.0).contains(&item.probability) {
                return Err(DomainError::InvalidProbability {
                    match_key: item.record.match_key(),
                    value: item.probability,
                });
            }
            let assessment = Self::assess(item.record, item.probability);
            if assessment.edge > self.threshold {
                flagged.push((assessment.edge, Self::to_bet(item.record, &assessment)));
            }
        }

        // Stable sort keeps input order among equal edges.
        flagged.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(flagged.into_iter().map(|(_, bet)| bet).collect())
    }

    fn to_bet(record: &MatchRecord, assessment: &EdgeAssessment) -> ValueBet {
        ValueBet {
            match_label: record.match_key(),
            market: MARKET_1X2.to_string(),
            odds: round_f64(record.prices.max_price(), 2),
            edge_pct: round_f64(assessment.edge * 100.0, 1),
            model_probability: assessment.model_probability,
            best_market_probability: assessment.best_market_probability,
        }
    }
}

fn round_f64(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{OutcomePrices, ShotCounts, TeamPair};
    use rust_decimal_macros::dec;

    fn record(home: &str, prices: (f64, f64, f64)) -> MatchRecord {
        MatchRecord::new(
            TeamPair::new(home, "B").unwrap(),
            OutcomePrices::new(prices.0, prices.1, prices.2).unwrap(),
            ShotCounts::new(10, 3),
        )
    }

    #[test]
    fn test_scenario_home_favourite_with_strong_model() {
        let r = record("A", (1.8, 3.5, 4.2));
        let bets = ValueDetector::new(0.15)
            .detect(&[ScoredMatch {
                record: &r,
                probability: 0.9,
            }])
            .unwrap();
        assert_eq!(bets.len(), 1);
        let bet = &bets[0];
        assert_eq!(bet.match_label, "A vs B");
        assert_eq!(bet.market, "1X2");
        assert_eq!(bet.odds, dec!(4.20));
        // (0.9 - 0.5556) * 100 = 34.44...
        assert_eq!(bet.edge_pct, dec!(34.4));
        assert!((bet.best_market_probability - 1.0 / 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_edge_below_threshold_not_flagged() {
        let r = record("A", (1.8, 3.5, 4.2));
        // Needs model prob > 0.7056 at threshold 0.15.
        let bets = ValueDetector::new(0.15)
            .detect(&[ScoredMatch {
                record: &r,
                probability: 0.70,
            }])
            .unwrap();
        assert!(bets.is_empty());
    }

    #[test]
    fn test_sorted_by_edge_descending() {
        let a = record("A", (2.0, 3.5, 4.0));
        let c = record("C", (2.0, 3.5, 4.0));
        let e = record("E", (2.0, 3.5, 4.0));
        let bets = ValueDetector::new(0.1)
            .detect(&[
                ScoredMatch { record: &a, probability: 0.7 },
                ScoredMatch { record: &c, probability: 0.95 },
                ScoredMatch { record: &e, probability: 0.8 },
            ])
            .unwrap();
        let labels: Vec<_> = bets.iter().map(|b| b.match_label.as_str()).collect();
        assert_eq!(labels, vec!["C vs B", "E vs B", "A vs B"]);
    }

    #[test]
    fn test_odds_are_longest_price_rounded() {
        let r = record("A", (1.333, 4.567, 9.999));
        let bets = ValueDetector::new(0.0)
            .detect(&[ScoredMatch { record: &r, probability: 1.0 }])
            .unwrap();
        assert_eq!(bets[0].odds, dec!(10.00));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let r = record("A", (1.8, 3.5, 4.2));
        let detector = ValueDetector::default();
        assert!(matches!(
            detector.detect(&[ScoredMatch { record: &r, probability: 1.2 }]),
            Err(DomainError::InvalidProbability { .. })
        ));
        assert!(detector
            .detect(&[ScoredMatch { record: &r, probability: f64::NAN }])
            .is_err());
    }

    #[test]
    fn test_empty_batch() {
        assert!(ValueDetector::default().detect(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_edge_equal_to_threshold_not_flagged() {
        let r = record("A", (2.0, 4.0, 4.0));
        let bets = ValueDetector::new(0.25)
            .detect(&[ScoredMatch { record: &r, probability: 0.75 }])
            .unwrap();
        assert!(bets.is_empty());
    }
}
