//! Prometheus Metrics Registry - Scanner Observability
//!
//! Registers the `value_scanner_*` metrics, records every cycle outcome
//! reported by the scheduler and serves them on `/metrics`.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::ports::telemetry::{CycleObserver, CycleSummary};

/// Centralized Prometheus metrics for the scanner.
pub struct ScanMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Cycles by outcome (`completed`, `failed`).
    pub cycles: IntCounterVec,
    /// Cycle wall-clock duration.
    pub cycle_duration: Histogram,
    /// Malformed records dropped, by source kind.
    pub records_dropped: IntCounterVec,
    /// Source fetch failures, by source kind.
    pub sources_unavailable: IntCounterVec,
    /// Matches aligned in the last completed cycle.
    pub aligned_matches: IntGauge,
    /// Value bets emitted.
    pub value_bets: IntCounter,
    /// Cycles whose alerts could not be delivered.
    pub delivery_failures: IntCounter,
}

impl ScanMetrics {
    /// Create and register all metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("value_scanner_cycles_total", "Scan cycles by outcome"),
            &["outcome"],
        )?;

        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "value_scanner_cycle_duration_seconds",
                "Scan cycle wall-clock duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
        )?;

        let records_dropped = IntCounterVec::new(
            Opts::new(
                "value_scanner_records_dropped_total",
                "Malformed source records dropped",
            ),
            &["source"],
        )?;

        let sources_unavailable = IntCounterVec::new(
            Opts::new(
                "value_scanner_source_unavailable_total",
                "Source fetches that failed",
            ),
            &["source"],
        )?;

        let aligned_matches = IntGauge::new(
            "value_scanner_aligned_matches",
            "Matches present in both sources in the last cycle",
        )?;

        let value_bets = IntCounter::new("value_scanner_value_bets_total", "Value bets emitted")?;

        let delivery_failures = IntCounter::new(
            "value_scanner_delivery_failures_total",
            "Cycles whose alerts the notifier rejected",
        )?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;
        registry.register(Box::new(records_dropped.clone()))?;
        registry.register(Box::new(sources_unavailable.clone()))?;
        registry.register(Box::new(aligned_matches.clone()))?;
        registry.register(Box::new(value_bets.clone()))?;
        registry.register(Box::new(delivery_failures.clone()))?;

        Ok(Self {
            registry,
            cycles,
            cycle_duration,
            records_dropped,
            sources_unavailable,
            aligned_matches,
            value_bets,
            delivery_failures,
        })
    }

    /// Encode the registry in the Prometheus text format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics = Arc::clone(&self);
        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics);
                async move { metrics.render() }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

impl CycleObserver for ScanMetrics {
    fn cycle_completed(&self, summary: &CycleSummary) {
        self.cycles.with_label_values(&["completed"]).inc();
        self.cycle_duration.observe(summary.duration_secs);
        self.records_dropped
            .with_label_values(&["odds"])
            .inc_by(summary.odds_dropped as u64);
        self.records_dropped
            .with_label_values(&["stats"])
            .inc_by(summary.stats_dropped as u64);
        if summary.odds_unavailable {
            self.sources_unavailable.with_label_values(&["odds"]).inc();
        }
        if summary.stats_unavailable {
            self.sources_unavailable.with_label_values(&["stats"]).inc();
        }
        self.aligned_matches
            .set(i64::try_from(summary.aligned).unwrap_or(i64::MAX));
        self.value_bets.inc_by(summary.value_bets as u64);
        if !summary.delivered {
            self.delivery_failures.inc();
        }
    }

    fn cycle_failed(&self, _reason: &str, duration_secs: f64) {
        self.cycles.with_label_values(&["failed"]).inc();
        self.cycle_duration.observe(duration_secs);
    }
}
