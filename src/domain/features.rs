//! Feature derivation from aligned match records.
//!
//! Four features per match: the raw implied probabilities of the three
//! 1X2 outcomes and the signed shot differential. No overround removal,
//! so the implied probabilities need not sum to 1.

use serde::{Deserialize, Serialize};

use super::records::{MatchRecord, Outcome, OutcomePrices, ShotCounts};

/// Number of features the probability model consumes.
pub const FEATURE_COUNT: usize = 4;

/// Feature names, in column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["implied_home", "implied_draw", "implied_away", "shot_diff"];

/// Numeric features of one match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub implied_home: f64,
    pub implied_draw: f64,
    pub implied_away: f64,
    pub shot_diff: f64,
}

impl FeatureVector {
    /// Derive features from validated prices and shot counts.
    pub fn from_parts(prices: &OutcomePrices, shots: &ShotCounts) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let shot_diff = shots.differential() as f64;
        Self {
            implied_home: prices.implied(Outcome::Home),
            implied_draw: prices.implied(Outcome::Draw),
            implied_away: prices.implied(Outcome::Away),
            shot_diff,
        }
    }

    /// Column layout used by the model.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.implied_home,
            self.implied_draw,
            self.implied_away,
            self.shot_diff,
        ]
    }
}

impl From<&MatchRecord> for FeatureVector {
    fn from(record: &MatchRecord) -> Self {
        Self::from_parts(&record.prices, &record.shots)
    }
}

/// Derive one feature vector per record, in order.
pub fn derive_features(records: &[MatchRecord]) -> Vec<FeatureVector> {
    records.iter().map(FeatureVector::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::TeamPair;

    fn record(home: f64, draw: f64, away: f64, hs: u32, aws: u32) -> MatchRecord {
        MatchRecord::new(
            TeamPair::new("A", "B").unwrap(),
            OutcomePrices::new(home, draw, away).unwrap(),
            ShotCounts::new(hs, aws),
        )
    }

    #[test]
    fn test_implied_probabilities_are_reciprocals() {
        let f = FeatureVector::from(&record(1.8, 3.5, 4.2, 10, 3));
        assert!((f.implied_home - 1.0 / 1.8).abs() < 1e-15);
        assert!((f.implied_draw - 1.0 / 3.5).abs() < 1e-15);
        assert!((f.implied_away - 1.0 / 4.2).abs() < 1e-15);
        assert!((f.shot_diff - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_shot_differential() {
        let f = FeatureVector::from(&record(2.5, 3.2, 2.9, 1, 12));
        assert!((f.shot_diff + 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_overround_removal() {
        let f = FeatureVector::from(&record(1.9, 3.4, 4.0, 5, 5));
        let sum = f.implied_home + f.implied_draw + f.implied_away;
        assert!(sum > 1.0, "raw implied probabilities keep the margin, got {sum}");
    }

    #[test]
    fn test_array_column_order() {
        let f = FeatureVector::from(&record(2.0, 4.0, 5.0, 3, 1));
        assert_eq!(f.to_array(), [0.5, 0.25, 0.2, 2.0]);
    }

    #[test]
    fn test_derive_features_empty() {
        assert!(derive_features(&[]).is_empty());
    }
}
