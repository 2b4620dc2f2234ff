//! Cycle Scheduler - Fixed-Interval, Non-Overlapping Scan Loop
//!
//! A single task owns the timer and awaits every cycle before polling
//! the next tick, so two cycles can never run at once. Each cycle runs
//! in its own tokio task: an error or panic inside it is logged at the
//! cycle boundary and the next tick proceeds normally.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{Instrument, error, info, info_span, instrument};
use uuid::Uuid;

use crate::ports::telemetry::CycleObserver;

use super::value_scanner::{CycleError, ScanCycle};

/// Counters returned when the scheduler stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
  /// Cycles that ran to completion.
  pub completed: u64,
  /// Cycles aborted by an error or panic.
  pub failed: u64,
}

/// Drives a `ScanCycle` on a fixed timer.
pub struct CycleScheduler<C: ScanCycle> {
  /// The cycle to run on every tick.
  cycle: Arc<C>,
  /// Telemetry sink.
  observer: Arc<dyn CycleObserver>,
  /// Period between cycle starts.
  interval: Duration,
  /// Delay before the first cycle.
  first_delay: Duration,
}

impl<C: ScanCycle> CycleScheduler<C> {
  /// Create a scheduler.
  pub fn new(
    cycle: Arc<C>,
    observer: Arc<dyn CycleObserver>,
    interval: Duration,
    first_delay: Duration,
  ) -> Self {
    Self {
      cycle,
      observer,
      interval,
      first_delay,
    }
  }

  /// Run until a shutdown signal arrives.
  ///
  /// A shutdown received mid-cycle takes effect once that cycle has
  /// finished; the running cycle is never interrupted.
  #[instrument(skip(self, shutdown_rx), name = "scheduler")]
  pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> SchedulerStats {
    let mut stats = SchedulerStats::default();
    let start = tokio::time::Instant::now() + self.first_delay;
    let mut ticker = interval_at(start, self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
      interval_secs = self.interval.as_secs_f64(),
      first_delay_secs = self.first_delay.as_secs_f64(),
      "Scheduler started"
    );

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Scheduler received shutdown signal");
          break;
        }
        _ = ticker.tick() => {
          if self.run_once().await.is_ok() {
            stats.completed += 1;
          } else {
            stats.failed += 1;
          }
        }
      }
    }

    info!(
      completed = stats.completed,
      failed = stats.failed,
      "Scheduler stopped"
    );
    stats
  }

  /// Run exactly one cycle and report it to the observer.
  pub async fn run_once(&self) -> Result<(), CycleError> {
    let cycle_id = Uuid::new_v4();
    let span = info_span!("cycle", id = %cycle_id);
    let started = Instant::now();

    let cycle = Arc::clone(&self.cycle);
    let handle = tokio::spawn(async move { cycle.run_cycle().await }.instrument(span));

    let outcome = match handle.await {
      Ok(result) => result,
      Err(join_err) => Err(CycleError::Aborted(join_err.to_string())),
    };

    match outcome {
      Ok(summary) => {
        self.observer.cycle_completed(&summary);
        Ok(())
      }
      Err(e) => {
        let elapsed = started.elapsed().as_secs_f64();
        error!(cycle = %cycle_id, error = %e, "Scan cycle failed, no alerts sent");
        self.observer.cycle_failed(&e.to_string(), elapsed);
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ports::telemetry::{CycleSummary, NoopObserver};
  use async_trait::async_trait;
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// Cycle that sleeps and tracks concurrency.
  #[derive(Default)]
  struct SlowCycle {
    runs: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    work: Duration,
  }

  #[async_trait]
  impl ScanCycle for SlowCycle {
    async fn run_cycle(&self) -> Result<CycleSummary, CycleError> {
      let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
      self.max_active.fetch_max(now, Ordering::SeqCst);
      tokio::time::sleep(self.work).await;
      self.active.fetch_sub(1, Ordering::SeqCst);
      self.runs.fetch_add(1, Ordering::SeqCst);
      Ok(CycleSummary::default())
    }
  }

  /// Fails on odd runs, panics on the second.
  #[derive(Default)]
  struct FlakyCycle {
    runs: AtomicUsize,
  }

  #[async_trait]
  impl ScanCycle for FlakyCycle {
    async fn run_cycle(&self) -> Result<CycleSummary, CycleError> {
      let n = self.runs.fetch_add(1, Ordering::SeqCst);
      match n {
        0 => Err(CycleError::ScoreCountMismatch {
          expected: 1,
          got: 0,
        }),
        1 => panic!("model exploded"),
        _ => Ok(CycleSummary::default()),
      }
    }
  }

  #[derive(Default)]
  struct RecordingObserver {
    completed: AtomicUsize,
    failures: Mutex<Vec<String>>,
  }

  impl CycleObserver for RecordingObserver {
    fn cycle_completed(&self, _summary: &CycleSummary) {
      self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn cycle_failed(&self, reason: &str, _duration_secs: f64) {
      self.failures.lock().unwrap().push(reason.to_string());
    }
  }

  #[tokio::test]
  async fn test_cycles_never_overlap() {
    // Work takes longer than the interval.
    let cycle = Arc::new(SlowCycle {
      work: Duration::from_millis(30),
      ..SlowCycle::default()
    });
    let scheduler = CycleScheduler::new(
      Arc::clone(&cycle),
      Arc::new(NoopObserver),
      Duration::from_millis(5),
      Duration::ZERO,
    );
    let (tx, rx) = broadcast::channel(1);
    let handle = tokio::spawn(async move { scheduler.run(rx).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(()).unwrap();
    let stats = handle.await.unwrap();

    assert!(stats.completed >= 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(cycle.max_active.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_failures_do_not_stop_schedule() {
    let cycle = Arc::new(FlakyCycle::default());
    let observer = Arc::new(RecordingObserver::default());
    let scheduler = CycleScheduler::new(
      Arc::clone(&cycle),
      Arc::clone(&observer) as Arc<dyn CycleObserver>,
      Duration::from_millis(10),
      Duration::ZERO,
    );
    let (tx, rx) = broadcast::channel(1);
    let handle = tokio::spawn(async move { scheduler.run(rx).await });

    tokio::time::sleep(Duration::from_millis(150)).await;
    tx.send(()).unwrap();
    let stats = handle.await.unwrap();

    assert_eq!(stats.failed, 2);
    assert!(stats.completed >= 1);
    let failures = observer.failures.lock().unwrap();
    assert_eq!(failures.len(), 2);
    assert!(failures[1].contains("aborted"));
    assert!(observer.completed.load(Ordering::SeqCst) >= 1);
  }

  #[tokio::test]
  async fn test_shutdown_before_first_tick() {
    let cycle = Arc::new(SlowCycle::default());
    let scheduler = CycleScheduler::new(
      Arc::clone(&cycle),
      Arc::new(NoopObserver),
      Duration::from_secs(300),
      Duration::from_secs(10),
    );
    let (tx, rx) = broadcast::channel(1);
    tx.send(()).unwrap();

    let stats = scheduler.run(rx).await;
    assert_eq!(stats, SchedulerStats::default());
    assert_eq!(cycle.runs.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_run_once_reports_error() {
    let scheduler = CycleScheduler::new(
      Arc::new(FlakyCycle::default()),
      Arc::new(NoopObserver),
      Duration::from_secs(1),
      Duration::ZERO,
    );
    assert!(matches!(
      scheduler.run_once().await,
      Err(CycleError::ScoreCountMismatch { .. })
    ));
    assert!(matches!(scheduler.run_once().await, Err(CycleError::Aborted(_))));
    assert!(scheduler.run_once().await.is_ok());
  }
}
