//! Synthetic training data for the probability model.
//!
//! Draws prices and shot counts from independent uniform ranges and
//! labels each sample with a pluggable rule. The default rule favours
//! the side with more shots when its price is short enough.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::features::{FEATURE_COUNT, FeatureVector};
use super::records::{OutcomePrices, ShotCounts};

/// Sampling ranges. Price ranges are `[lo, hi)`, shot ranges `lo..hi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub samples: usize,
    pub seed: u64,
    pub home_price: (f64, f64),
    pub draw_price: (f64, f64),
    pub away_price: (f64, f64),
    pub home_shots: (u32, u32),
    pub away_shots: (u32, u32),
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            samples: 4000,
            seed: 42,
            home_price: (1.5, 6.5),
            draw_price: (3.0, 5.0),
            away_price: (1.5, 7.0),
            home_shots: (2, 20),
            away_shots: (1, 18),
        }
    }
}

impl SyntheticConfig {
    fn validate(&self) -> Result<(), ModelError> {
        if self.samples == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        for (name, (lo, hi)) in [
            ("home_price", self.home_price),
            ("draw_price", self.draw_price),
            ("away_price", self.away_price),
        ] {
            if !(lo >= 1.0 && lo < hi && hi.is_finite()) {
                return Err(ModelError::InvalidParameter {
                    name,
                    reason: format!("range [{lo}, {hi}) must satisfy 1.0 <= lo < hi"),
                });
            }
        }
        for (name, (lo, hi)) in [("home_shots", self.home_shots), ("away_shots", self.away_shots)] {
            if lo >= hi {
                return Err(ModelError::InvalidParameter {
                    name,
                    reason: format!("range {lo}..{hi} is empty"),
                });
            }
        }
        Ok(())
    }
}

/// One generated match before labelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSample {
    pub prices: OutcomePrices,
    pub shots: ShotCounts,
}

/// Decides the binary target of a training sample.
///
/// Swapping the implementation (e.g. for one backed by historical
/// results) leaves the model interface untouched.
pub trait SampleLabeler: Send + Sync {
    fn label(&self, sample: &SyntheticSample) -> bool;
}

/// Positive when the side with more shots is priced short enough:
/// home leads on shots and home price < `home_cutoff`, or home does not
/// lead and away price < `away_cutoff`.
#[derive(Debug, Clone, Copy)]
pub struct ShotsAndPriceRule {
    pub home_cutoff: f64,
    pub away_cutoff: f64,
}

impl Default for ShotsAndPriceRule {
    fn default() -> Self {
        Self {
            home_cutoff: 2.0,
            away_cutoff: 2.2,
        }
    }
}

impl SampleLabeler for ShotsAndPriceRule {
    fn label(&self, sample: &SyntheticSample) -> bool {
        let diff = sample.shots.differential();
        (diff > 0 && sample.prices.home() < self.home_cutoff)
            || (diff <= 0 && sample.prices.away() < self.away_cutoff)
    }
}

/// Feature rows with binary labels.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    rows: Vec<[f64; FEATURE_COUNT]>,
    labels: Vec<bool>,
}

impl TrainingSet {
    /// Build from parallel feature and label vectors; extra items on
    /// the longer side are ignored.
    pub fn new(features: &[FeatureVector], labels: &[bool]) -> Self {
        let n = features.len().min(labels.len());
        Self {
            rows: features[..n].iter().map(FeatureVector::to_array).collect(),
            labels: labels[..n].to_vec(),
        }
    }

    /// Generate a labelled synthetic set from a seeded RNG.
    pub fn synthetic(
        config: &SyntheticConfig,
        labeler: &dyn SampleLabeler,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut set = Self {
            rows: Vec::with_capacity(config.samples),
            labels: Vec::with_capacity(config.samples),
        };

        for _ in 0..config.samples {
            let prices = OutcomePrices::new(
                rng.gen_range(config.home_price.0..config.home_price.1),
                rng.gen_range(config.draw_price.0..config.draw_price.1),
                rng.gen_range(config.away_price.0..config.away_price.1),
            )
            .map_err(|e| ModelError::InvalidParameter {
                name: "price_range",
                reason: e.to_string(),
            })?;
            let shots = ShotCounts::new(
                rng.gen_range(config.home_shots.0..config.home_shots.1),
                rng.gen_range(config.away_shots.0..config.away_shots.1),
            );
            let sample = SyntheticSample { prices, shots };
            set.rows.push(FeatureVector::from_parts(&prices, &shots).to_array());
            set.labels.push(labeler.label(&sample));
        }

        Ok(set)
    }

    pub fn rows(&self) -> &[[f64; FEATURE_COUNT]] {
        &self.rows
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }
}
