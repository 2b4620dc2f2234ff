//! Domain layer - Core value-detection logic and models.
//!
//! Pure, synchronous code: record validation, alignment, feature
//! derivation, the boosted-tree probability model and the value
//! detector. No I/O and no logging here (hexagonal architecture inner
//! ring); callers log the counts these functions return.

pub mod aligner;
pub mod detector;
pub mod error;
pub mod features;
pub mod model;
pub mod records;
pub mod synthetic;
pub mod tree;

// Re-export core types for convenience
pub use aligner::{Alignment, RecordAligner, TeamMatching};
pub use detector::{EdgeAssessment, ScoredMatch, ValueBet, ValueDetector};
pub use error::{DomainError, ModelError};
pub use features::{FeatureVector, derive_features};
pub use model::{BoostingParams, GradientBoostedClassifier, ProbabilityEstimator, TrainingReport};
pub use records::{MatchRecord, OddsRecord, Outcome, OutcomePrices, ShotCounts, StatsRecord, TeamPair};
pub use synthetic::{SampleLabeler, ShotsAndPriceRule, SyntheticConfig, TrainingSet};
