//! Match Source Ports - Upstream Odds and Stats Interfaces
//!
//! Defines the traits for the two independent data producers and the
//! loosely-typed records they emit. Team names arrive as strings and
//! numeric fields as raw JSON values (numbers or numeric strings);
//! validation into domain records happens in the ingest use case.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw 1X2 odds for one match, as produced by the odds source.
///
/// Prices accept the market shorthand keys `"1"`, `"X"`, `"2"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOddsRecord {
  /// Home team name.
  #[serde(default)]
  pub home: Option<String>,
  /// Away team name.
  #[serde(default)]
  pub away: Option<String>,
  /// Home-win decimal price.
  #[serde(default, alias = "1")]
  pub home_odds: Option<Value>,
  /// Draw decimal price.
  #[serde(default, alias = "X", alias = "x")]
  pub draw_odds: Option<Value>,
  /// Away-win decimal price.
  #[serde(default, alias = "2")]
  pub away_odds: Option<Value>,
}

/// Raw in-play statistics for one match, as produced by the stats source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatsRecord {
  /// Home team name.
  #[serde(default)]
  pub home: Option<String>,
  /// Away team name.
  #[serde(default)]
  pub away: Option<String>,
  /// Home shot count.
  #[serde(default)]
  pub home_shots: Option<Value>,
  /// Away shot count.
  #[serde(default)]
  pub away_shots: Option<Value>,
}

/// Producer of live 1X2 odds.
///
/// An `Err` means the whole source is unavailable this cycle; the
/// scanner treats it as an empty batch.
#[async_trait]
pub trait OddsSource: Send + Sync + 'static {
  /// Fetch the current odds batch.
  async fn fetch_odds(&self) -> anyhow::Result<Vec<RawOddsRecord>>;

  /// Source name for logs and metrics labels.
  fn name(&self) -> &str;
}

/// Producer of live match statistics.
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
  /// Fetch the current stats batch.
  async fn fetch_stats(&self) -> anyhow::Result<Vec<RawStatsRecord>>;

  /// Source name for logs and metrics labels.
  fn name(&self) -> &str;
}
