//! Configuration Loader - File Loading, Overrides and Validation
//!
//! Handles loading `config.toml`, applying environment overrides,
//! validating all parameters, and providing clear error messages for
//! misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "VALUE_SCANNER_CONFIG";
/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// Override for `scanner.interval_seconds`.
pub const INTERVAL_ENV: &str = "SCAN_INTERVAL_SECONDS";
/// Override for `scanner.value_threshold`.
pub const THRESHOLD_ENV: &str = "VALUE_THRESHOLD";

/// Locate, load, override and validate the configuration.
///
/// An explicitly named file must exist. When no file is named and
/// `config.toml` is absent, built-in defaults are used.
pub fn load_from_env() -> Result<AppConfig> {
  match std::env::var(CONFIG_PATH_ENV) {
    Ok(path) => load_config(&path),
    Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
    Err(_) => {
      let mut config = AppConfig::default();
      apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
      validate_config(&config)?;
      info!("No config file found, using built-in defaults");
      Ok(config)
    }
  }
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - An environment override is not a number
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config: AppConfig = toml::from_str(&content)
    .with_context(|| format!("Failed to parse {}", path.display()))?;

  apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
  validate_config(&config)?;

  info!(
    path = %path.display(),
    interval_secs = config.scanner.interval_seconds,
    threshold = config.scanner.value_threshold,
    matching = ?config.scanner.team_matching,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Apply `SCAN_INTERVAL_SECONDS` / `VALUE_THRESHOLD` overrides.
///
/// `lookup` abstracts the environment so tests need not mutate it.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(raw) = lookup(INTERVAL_ENV) {
    config.scanner.interval_seconds = raw
      .trim()
      .parse()
      .with_context(|| format!("{INTERVAL_ENV} must be a whole number of seconds, got {raw:?}"))?;
  }
  if let Some(raw) = lookup(THRESHOLD_ENV) {
    config.scanner.value_threshold = raw
      .trim()
      .parse()
      .with_context(|| format!("{THRESHOLD_ENV} must be a number, got {raw:?}"))?;
  }
  Ok(())
}

/// Validate all configuration parameters.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Scanner validation
  anyhow::ensure!(
    config.scanner.interval_seconds > 0,
    "scanner.interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.scanner.value_threshold.is_finite()
      && (0.0..1.0).contains(&config.scanner.value_threshold),
    "scanner.value_threshold must be in [0, 1), got {}",
    config.scanner.value_threshold
  );

  // Model validation
  anyhow::ensure!(
    config.model.training_samples > 0,
    "model.training_samples must be positive"
  );
  config
    .model
    .boosting()
    .validate()
    .context("Invalid model configuration")?;

  // Source validation
  anyhow::ensure!(
    config.sources.timeout_seconds > 0,
    "sources.timeout_seconds must be positive"
  );
  for (key, url) in [
    ("odds_url", &config.sources.odds_url),
    ("stats_url", &config.sources.stats_url),
  ] {
    if let Some(url) = url {
      anyhow::ensure!(
        url.starts_with("http://") || url.starts_with("https://"),
        "sources.{key} must be an http(s) URL, got {url:?}"
      );
    }
  }

  // Metrics validation
  if config.metrics.enabled {
    anyhow::ensure!(
      !config.metrics.bind_address.is_empty(),
      "metrics.bind_address must not be empty"
    );
  }

  Ok(())
}
