//! Value Scanner - One Evaluation Cycle of the Pipeline
//!
//! A cycle is strictly sequential:
//! 1. Fetch raw odds and stats (a failing source yields an empty batch)
//! 2. Validate records, dropping malformed ones
//! 3. Align the two batches on team identity
//! 4. Derive features
//! 5. Score with the shared, read-only probability model
//! 6. Detect and rank value bets
//! 7. Hand the bets to the notifier (failures logged, never replayed)

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::aligner::RecordAligner;
use crate::domain::detector::{ScoredMatch, ValueBet, ValueDetector};
use crate::domain::error::DomainError;
use crate::domain::features::derive_features;
use crate::domain::model::ProbabilityEstimator;
use crate::domain::records::{MatchRecord, OddsRecord, StatsRecord};
use crate::ports::match_source::{OddsSource, StatsSource};
use crate::ports::notifier::AlertNotifier;
use crate::ports::telemetry::CycleSummary;

use super::ingest::{ingest_odds, ingest_stats};

/// A cycle aborted between alignment and detection. No alerts are sent.
#[derive(Error, Debug)]
pub enum CycleError {
  #[error("value detection failed: {0}")]
  Detection(#[from] DomainError),

  #[error("model returned {got} probabilities for {expected} matches")]
  ScoreCountMismatch { expected: usize, got: usize },

  #[error("cycle task aborted: {0}")]
  Aborted(String),
}

/// Output of the pure part of a cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
  /// Matches present in both sources.
  pub matches: Vec<MatchRecord>,
  /// Model probability per match, same order as `matches`.
  pub probabilities: Vec<f64>,
  /// Ranked value bets.
  pub bets: Vec<ValueBet>,
}

/// Anything the scheduler can run once per tick.
#[async_trait]
pub trait ScanCycle: Send + Sync + 'static {
  async fn run_cycle(&self) -> Result<CycleSummary, CycleError>;
}

/// Runs the value-detection pipeline against the configured ports.
pub struct ValueScanner<O: OddsSource, S: StatsSource, N: AlertNotifier> {
  /// Odds producer.
  odds_source: Arc<O>,
  /// Stats producer.
  stats_source: Arc<S>,
  /// Alert sink.
  notifier: Arc<N>,
  /// Trained model, shared read-only across cycles.
  model: Arc<dyn ProbabilityEstimator>,
  /// Team-identity join.
  aligner: RecordAligner,
  /// Edge thresholding and ranking.
  detector: ValueDetector,
}

impl<O: OddsSource, S: StatsSource, N: AlertNotifier> ValueScanner<O, S, N> {
  /// Create a scanner.
  pub fn new(
    odds_source: Arc<O>,
    stats_source: Arc<S>,
    notifier: Arc<N>,
    model: Arc<dyn ProbabilityEstimator>,
    aligner: RecordAligner,
    detector: ValueDetector,
  ) -> Self {
    Self {
      odds_source,
      stats_source,
      notifier,
      model,
      aligner,
      detector,
    }
  }

  /// Align, featurize, score and detect on validated batches.
  ///
  /// Pure with respect to the ports: no fetching and no notification.
  pub fn evaluate(
    &self,
    odds: &[OddsRecord],
    stats: &[StatsRecord],
  ) -> Result<Evaluation, CycleError> {
    let alignment = self.aligner.align(odds, stats);
    if alignment.duplicate_odds > 0 || alignment.duplicate_stats > 0 {
      warn!(
        duplicate_odds = alignment.duplicate_odds,
        duplicate_stats = alignment.duplicate_stats,
        "Duplicate match identities in source batch, first occurrence kept"
      );
    }
    debug!(
      aligned = alignment.records.len(),
      unmatched_odds = alignment.unmatched_odds,
      matching = ?self.aligner.matching(),
      "Records aligned"
    );

    let matches = alignment.records;
    if matches.is_empty() {
      return Ok(Evaluation::default());
    }

    let features = derive_features(&matches);
    let probabilities = self.model.predict_batch(&features);
    if probabilities.len() != matches.len() {
      return Err(CycleError::ScoreCountMismatch {
        expected: matches.len(),
        got: probabilities.len(),
      });
    }

    let scored: Vec<ScoredMatch<'_>> = matches
      .iter()
      .zip(&probabilities)
      .map(|(record, &probability)| ScoredMatch {
        record,
        probability,
      })
      .collect();
    let bets = self.detector.detect(&scored)?;

    Ok(Evaluation {
      matches,
      probabilities,
      bets,
    })
  }

  /// Run one full cycle: fetch, evaluate, notify.
  #[instrument(skip(self), name = "scan_cycle")]
  pub async fn scan(&self) -> Result<CycleSummary, CycleError> {
    let start = Instant::now();
    let mut summary = CycleSummary {
      started_at: Utc::now(),
      ..CycleSummary::default()
    };

    let raw_odds = match self.odds_source.fetch_odds().await {
      Ok(batch) => batch,
      Err(e) => {
        warn!(source = self.odds_source.name(), error = %e, "Odds source unavailable");
        summary.odds_unavailable = true;
        Vec::new()
      }
    };
    let raw_stats = match self.stats_source.fetch_stats().await {
      Ok(batch) => batch,
      Err(e) => {
        warn!(source = self.stats_source.name(), error = %e, "Stats source unavailable");
        summary.stats_unavailable = true;
        Vec::new()
      }
    };
    summary.odds_received = raw_odds.len();
    summary.stats_received = raw_stats.len();

    let odds = ingest_odds(self.odds_source.name(), &raw_odds);
    let stats = ingest_stats(self.stats_source.name(), &raw_stats);
    summary.odds_dropped = odds.dropped;
    summary.stats_dropped = stats.dropped;

    let evaluation = self.evaluate(&odds.records, &stats.records)?;
    summary.aligned = evaluation.matches.len();
    summary.value_bets = evaluation.bets.len();
    summary.delivered = true;

    for bet in &evaluation.bets {
      info!(
        match_label = %bet.match_label,
        market = %bet.market,
        odds = %bet.odds,
        edge_pct = %bet.edge_pct,
        model_prob = bet.model_probability,
        "Value bet detected"
      );
    }

    if !evaluation.bets.is_empty() {
      if let Err(e) = self.notifier.notify(&evaluation.bets).await {
        warn!(
          notifier = self.notifier.name(),
          bets = evaluation.bets.len(),
          error = %e,
          "Alert delivery failed"
        );
        summary.delivered = false;
      }
    }

    summary.duration_secs = start.elapsed().as_secs_f64();
    info!(
      started_at = %summary.started_at.to_rfc3339(),
      odds = summary.odds_received,
      stats = summary.stats_received,
      dropped = summary.odds_dropped + summary.stats_dropped,
      aligned = summary.aligned,
      value_bets = summary.value_bets,
      duration_ms = start.elapsed().as_millis(),
      "Scan cycle complete"
    );

    Ok(summary)
  }
}

#[async_trait]
impl<O: OddsSource, S: StatsSource, N: AlertNotifier> ScanCycle for ValueScanner<O, S, N> {
  async fn run_cycle(&self) -> Result<CycleSummary, CycleError> {
    self.scan().await
  }
}
