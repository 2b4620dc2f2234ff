//! Probability model: gradient-boosted trees with log-loss.
//!
//! Trained once at startup and never mutated afterwards. The trained
//! model is shared read-only by every scan cycle through the
//! `ProbabilityEstimator` trait.

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::features::{FEATURE_COUNT, FeatureVector};
use super::synthetic::TrainingSet;
use super::tree::{FeatureBinner, RegressionTree, TreeParams};

/// Upper bound on tree depth accepted by `BoostingParams`.
pub const MAX_TREE_DEPTH: usize = 8;
/// Upper bound on ensemble size accepted by `BoostingParams`.
pub const MAX_TREES: usize = 400;

/// Floor on the per-sample hessian so near-certain samples stay finite.
const MIN_HESSIAN: f64 = 1e-16;

/// Hyper-parameters of the boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    pub max_bins: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_trees: MAX_TREES,
            max_depth: MAX_TREE_DEPTH,
            learning_rate: 0.1,
            min_samples_leaf: 1,
            l2_regularization: 1.0,
            max_bins: 64,
        }
    }
}

impl BoostingParams {
    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |name: &'static str, reason: String| {
            Err(ModelError::InvalidParameter { name, reason })
        };
        if self.n_trees == 0 || self.n_trees > MAX_TREES {
            return invalid("n_trees", format!("{} not in 1..={MAX_TREES}", self.n_trees));
        }
        if self.max_depth == 0 || self.max_depth > MAX_TREE_DEPTH {
            return invalid(
                "max_depth",
                format!("{} not in 1..={MAX_TREE_DEPTH}", self.max_depth),
            );
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return invalid("learning_rate", format!("{} not in (0, 1]", self.learning_rate));
        }
        if self.min_samples_leaf == 0 {
            return invalid("min_samples_leaf", "must be at least 1".to_string());
        }
        if !(self.l2_regularization >= 0.0 && self.l2_regularization.is_finite()) {
            return invalid(
                "l2_regularization",
                format!("{} must be finite and >= 0", self.l2_regularization),
            );
        }
        if !(2..=256).contains(&self.max_bins) {
            return invalid("max_bins", format!("{} not in 2..=256", self.max_bins));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            l2_regularization: self.l2_regularization,
            min_split_gain: 1e-12,
        }
    }
}

/// Scores feature vectors with a probability of the value-favouring outcome.
pub trait ProbabilityEstimator: Send + Sync {
    /// Probability in [0, 1] for one match.
    fn predict_proba(&self, features: &FeatureVector) -> f64;

    /// One probability per vector, in order. Empty in, empty out.
    fn predict_batch(&self, features: &[FeatureVector]) -> Vec<f64> {
        features.iter().map(|f| self.predict_proba(f)).collect()
    }

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Summary of a completed training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub samples: usize,
    pub positives: usize,
    pub trees: usize,
    pub max_depth_reached: usize,
    pub train_log_loss: f64,
    pub train_accuracy: f64,
}

/// Binary classifier: `sigmoid(base + lr * sum(tree(x)))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
    report: TrainingReport,
}

impl GradientBoostedClassifier {
    /// Fit the ensemble on a labelled set.
    ///
    /// # Errors
    /// `EmptyTrainingSet`, `SingleClass` when every label is equal, or
    /// `InvalidParameter` for out-of-range hyper-parameters.
    pub fn train(set: &TrainingSet, params: &BoostingParams) -> Result<Self, ModelError> {
        params.validate()?;
        if set.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let total = set.len();
        let positives = set.positives();
        if positives == 0 || positives == total {
            return Err(ModelError::SingleClass { positives, total });
        }

        #[allow(clippy::cast_precision_loss)]
        let base_rate = positives as f64 / total as f64;
        let base_score = (base_rate / (1.0 - base_rate)).ln();

        let rows = set.rows();
        let targets: Vec<f64> = set
            .labels()
            .iter()
            .map(|&l| if l { 1.0 } else { 0.0 })
            .collect();
        let binner = FeatureBinner::fit(rows, params.max_bins);
        let binned = binner.bin_rows(rows);
        let tree_params = params.tree_params();

        let mut raw = vec![base_score; total];
        let mut grad = vec![0.0; total];
        let mut hess = vec![0.0; total];
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            for i in 0..total {
                let p = sigmoid(raw[i]);
                grad[i] = p - targets[i];
                hess[i] = (p * (1.0 - p)).max(MIN_HESSIAN);
            }
            let tree = RegressionTree::fit(&binned, &binner, &grad, &hess, &tree_params);
            for (score, row) in raw.iter_mut().zip(rows) {
                *score += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        let report = TrainingReport {
            samples: total,
            positives,
            trees: trees.len(),
            max_depth_reached: trees.iter().map(RegressionTree::depth).max().unwrap_or(0),
            train_log_loss: log_loss(&raw, &targets),
            train_accuracy: accuracy(&raw, &targets),
        };

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            trees,
            report,
        })
    }

    /// Raw log-odds for one feature row.
    pub fn decision_function(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + self.learning_rate * tree.predict(row))
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl ProbabilityEstimator for GradientBoostedClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.decision_function(&features.to_array()))
    }

    fn name(&self) -> &str {
        "gradient_boosted_trees"
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn log_loss(raw: &[f64], targets: &[f64]) -> f64 {
    const EPS: f64 = 1e-15;
    let total: f64 = raw
        .iter()
        .zip(targets)
        .map(|(&r, &y)| {
            let p = sigmoid(r).clamp(EPS, 1.0 - EPS);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let n = raw.len().max(1) as f64;
    total / n
}

#[allow(clippy::cast_precision_loss)]
fn accuracy(raw: &[f64], targets: &[f64]) -> f64 {
    let correct = raw
        .iter()
        .zip(targets)
        .filter(|&(&r, &y)| (r > 0.0) == (y > 0.5))
        .count();
    correct as f64 / raw.len().max(1) as f64
}
