//! Value Bet Scanner - Entry Point
//!
//! Wiring sequence:
//! 1. Load `.env`, config.toml + env overrides, validate
//! 2. Init tracing (JSON structured logging)
//! 3. Train the probability model on synthetic data (fatal on failure)
//! 4. Build the odds/stats HTTP sources
//! 5. Pick the notifier (Telegram, or log-only in dry-run / unconfigured)
//! 6. Spawn the Prometheus metrics server when enabled
//! 7. Spawn the cycle scheduler
//! 8. Wait for SIGINT, let the running cycle finish, exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use value_bet_scanner::adapters::metrics::ScanMetrics;
use value_bet_scanner::adapters::notify::{LogNotifier, TelegramCredentials, TelegramNotifier};
use value_bet_scanner::adapters::sources::HttpJsonSource;
use value_bet_scanner::config::{self, AppConfig};
use value_bet_scanner::domain::aligner::RecordAligner;
use value_bet_scanner::domain::detector::ValueDetector;
use value_bet_scanner::domain::model::{GradientBoostedClassifier, ProbabilityEstimator};
use value_bet_scanner::domain::synthetic::{ShotsAndPriceRule, TrainingSet};
use value_bet_scanner::ports::notifier::AlertNotifier;
use value_bet_scanner::ports::telemetry::{CycleObserver, NoopObserver};
use value_bet_scanner::usecases::scheduler::CycleScheduler;
use value_bet_scanner::usecases::value_scanner::ValueScanner;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let _ = dotenvy::dotenv();
    let config = config::loader::load_from_env().context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.bot.dry_run,
        interval_secs = config.scanner.interval_seconds,
        threshold = config.scanner.value_threshold,
        "Starting value bet scanner"
    );

    // ── 3. Train the model once, before any cycle ───────────
    let model = train_model(&config)
        .await
        .context("Model initialization failed")?;

    // ── 4. Sources ──────────────────────────────────────────
    let timeout = Duration::from_secs(config.sources.timeout_seconds);
    let odds_url = config
        .sources
        .odds_url
        .clone()
        .context("sources.odds_url is not configured")?;
    let stats_url = config
        .sources
        .stats_url
        .clone()
        .context("sources.stats_url is not configured")?;
    let odds_source = Arc::new(HttpJsonSource::new("odds", odds_url, timeout)?);
    let stats_source = Arc::new(HttpJsonSource::new("stats", stats_url, timeout)?);

    // ── 5. Shutdown channel + metrics ───────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    let observer: Arc<dyn CycleObserver> = if config.metrics.enabled {
        let metrics = Arc::new(ScanMetrics::new().context("Failed to register metrics")?);
        let server = Arc::clone(&metrics);
        let bind_address = config.metrics.bind_address.clone();
        let metrics_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = server.serve(bind_address, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        });
        metrics
    } else {
        Arc::new(NoopObserver)
    };

    // ── 6. Notifier + scheduler ─────────────────────────────
    let credentials = TelegramCredentials::from_env();
    let scheduler_shutdown = shutdown_tx.subscribe();
    let scheduler_handle = if config.bot.dry_run || !config.telegram.enabled || credentials.is_none() {
        if !config.bot.dry_run && config.telegram.enabled {
            warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_ID not set, alerts will only be logged");
        }
        spawn_scheduler(
            &config,
            odds_source,
            stats_source,
            Arc::new(LogNotifier),
            model,
            observer,
            scheduler_shutdown,
        )
    } else {
        let credentials = credentials.context("Telegram credentials missing")?;
        let notifier = TelegramNotifier::new(
            credentials,
            Duration::from_secs(config.telegram.timeout_seconds),
        )?;
        spawn_scheduler(
            &config,
            odds_source,
            stats_source,
            Arc::new(notifier),
            model,
            observer,
            scheduler_shutdown,
        )
    };

    info!("Scanner running");

    // ── 7. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, finishing current cycle");
    let _ = shutdown_tx.send(());

    match scheduler_handle.await {
        Ok(stats) => info!(
            completed = stats.completed,
            failed = stats.failed,
            "Shutdown complete"
        ),
        Err(e) => error!(error = %e, "Scheduler task ended abnormally"),
    }
    Ok(())
}

/// Generate the synthetic set and fit the classifier off the runtime.
async fn train_model(config: &AppConfig) -> Result<Arc<dyn ProbabilityEstimator>> {
    let synthetic = config.model.synthetic();
    let params = config.model.boosting();

    let model = tokio::task::spawn_blocking(move || {
        let set = TrainingSet::synthetic(&synthetic, &ShotsAndPriceRule::default())?;
        GradientBoostedClassifier::train(&set, &params)
    })
    .await
    .context("Training task panicked")??;

    let report = model.report();
    info!(
        samples = report.samples,
        positives = report.positives,
        trees = report.trees,
        max_depth = report.max_depth_reached,
        log_loss = report.train_log_loss,
        accuracy = report.train_accuracy,
        "Probability model trained"
    );
    Ok(Arc::new(model))
}

fn spawn_scheduler<N: AlertNotifier>(
    config: &AppConfig,
    odds_source: Arc<HttpJsonSource>,
    stats_source: Arc<HttpJsonSource>,
    notifier: Arc<N>,
    model: Arc<dyn ProbabilityEstimator>,
    observer: Arc<dyn CycleObserver>,
    shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<value_bet_scanner::usecases::scheduler::SchedulerStats> {
    info!(notifier = notifier.name(), "Notifier selected");
    let scanner = ValueScanner::new(
        odds_source,
        stats_source,
        notifier,
        model,
        RecordAligner::new(config.scanner.team_matching),
        ValueDetector::new(config.scanner.value_threshold),
    );
    let scheduler = CycleScheduler::new(
        Arc::new(scanner),
        observer,
        Duration::from_secs(config.scanner.interval_seconds),
        Duration::from_secs(config.scanner.first_run_delay_seconds),
    );
    tokio::spawn(async move { scheduler.run(shutdown_rx).await })
}
