//! Configuration Module - TOML-based Scanner Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides via `.env` files.
//! Secrets (the Telegram token and chat id) are never read from the
//! file; they come from the environment only.

pub mod loader;

use serde::Deserialize;

use crate::domain::aligner::TeamMatching;
use crate::domain::model::BoostingParams;
use crate::domain::synthetic::SyntheticConfig;

/// Top-level scanner configuration.
///
/// Every section is optional in the file; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  #[serde(default)]
  pub bot: BotConfig,
  /// Scheduling and detection policy.
  #[serde(default)]
  pub scanner: ScannerConfig,
  /// Synthetic training and boosting parameters.
  #[serde(default)]
  pub model: ModelConfig,
  /// Upstream data endpoints.
  #[serde(default)]
  pub sources: SourcesConfig,
  /// Telegram delivery.
  #[serde(default)]
  pub telegram: TelegramConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Human-readable name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Log alerts instead of sending them.
  #[serde(default)]
  pub dry_run: bool,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      dry_run: false,
    }
  }
}

/// Scan loop and value policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
  /// Seconds between cycle starts.
  #[serde(default = "default_interval")]
  pub interval_seconds: u64,
  /// Minimum edge (exclusive) for a value bet.
  #[serde(default = "default_value_threshold")]
  pub value_threshold: f64,
  /// Delay before the first cycle.
  #[serde(default = "default_first_run_delay")]
  pub first_run_delay_seconds: u64,
  /// Team-name join mode.
  #[serde(default)]
  pub team_matching: TeamMatching,
}

impl Default for ScannerConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_interval(),
      value_threshold: default_value_threshold(),
      first_run_delay_seconds: default_first_run_delay(),
      team_matching: TeamMatching::default(),
    }
  }
}

/// Model training parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
  /// Synthetic samples to train on.
  #[serde(default = "default_training_samples")]
  pub training_samples: usize,
  /// RNG seed for the synthetic set.
  #[serde(default = "default_seed")]
  pub seed: u64,
  /// Boosting rounds.
  #[serde(default = "default_n_trees")]
  pub n_trees: usize,
  /// Maximum depth per tree.
  #[serde(default = "default_max_depth")]
  pub max_depth: usize,
  /// Shrinkage per round.
  #[serde(default = "default_learning_rate")]
  pub learning_rate: f64,
  /// Histogram bins per feature.
  #[serde(default = "default_max_bins")]
  pub max_bins: usize,
  /// Minimum samples in a leaf.
  #[serde(default = "default_min_samples_leaf")]
  pub min_samples_leaf: usize,
  /// L2 penalty on leaf values.
  #[serde(default = "default_l2")]
  pub l2_regularization: f64,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      training_samples: default_training_samples(),
      seed: default_seed(),
      n_trees: default_n_trees(),
      max_depth: default_max_depth(),
      learning_rate: default_learning_rate(),
      max_bins: default_max_bins(),
      min_samples_leaf: default_min_samples_leaf(),
      l2_regularization: default_l2(),
    }
  }
}

impl ModelConfig {
  /// Synthetic data generation settings.
  pub fn synthetic(&self) -> SyntheticConfig {
    SyntheticConfig {
      samples: self.training_samples,
      seed: self.seed,
      ..SyntheticConfig::default()
    }
  }

  /// Boosting hyper-parameters.
  pub fn boosting(&self) -> BoostingParams {
    BoostingParams {
      n_trees: self.n_trees,
      max_depth: self.max_depth,
      learning_rate: self.learning_rate,
      min_samples_leaf: self.min_samples_leaf,
      l2_regularization: self.l2_regularization,
      max_bins: self.max_bins,
    }
  }
}

/// Upstream endpoints. A missing URL means the source is unavailable
/// every cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
  /// Odds endpoint serving a JSON array.
  #[serde(default)]
  pub odds_url: Option<String>,
  /// Stats endpoint serving a JSON array.
  #[serde(default)]
  pub stats_url: Option<String>,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

impl Default for SourcesConfig {
  fn default() -> Self {
    Self {
      odds_url: None,
      stats_url: None,
      timeout_seconds: default_timeout(),
    }
  }
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
  /// Send alerts to Telegram when credentials are present.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

impl Default for TelegramConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      timeout_seconds: default_timeout(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default)]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "value-bet-scanner".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_interval() -> u64 {
  300
}

fn default_value_threshold() -> f64 {
  crate::domain::detector::DEFAULT_VALUE_THRESHOLD
}

fn default_first_run_delay() -> u64 {
  10
}

fn default_training_samples() -> usize {
  4000
}

fn default_seed() -> u64 {
  42
}

fn default_n_trees() -> usize {
  400
}

fn default_max_depth() -> usize {
  8
}

fn default_learning_rate() -> f64 {
  0.1
}

fn default_max_bins() -> usize {
  64
}

fn default_min_samples_leaf() -> usize {
  1
}

fn default_l2() -> f64 {
  1.0
}

fn default_timeout() -> u64 {
  15
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
