//! Typed domain errors.
//!
//! Validation failures at record construction and model training
//! failures. Record errors are always recoverable (the record is
//! dropped); model errors are fatal at startup.

use thiserror::Error;

use super::records::Outcome;

/// A raw record could not be turned into a valid domain record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("team name for {side} side is empty")]
    EmptyTeamName { side: &'static str },

    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("field {field} is not numeric: {raw}")]
    NotNumeric { field: &'static str, raw: String },

    #[error("invalid {outcome} price {value}: decimal prices must be finite and >= 1.0")]
    InvalidPrice { outcome: Outcome, value: f64 },

    #[error("invalid shot count for {field}: {raw}")]
    InvalidShotCount { field: &'static str, raw: String },

    #[error("model probability {value} for {match_key} is outside [0, 1]")]
    InvalidProbability { match_key: String, value: f64 },
}

/// The probability model could not be trained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training labels contain a single class ({positives} positives of {total})")]
    SingleClass { positives: usize, total: usize },

    #[error("invalid boosting parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
