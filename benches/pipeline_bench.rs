//! Pipeline Benchmarks - Per-Cycle Hot Path
//!
//! Benchmarks the pure stages that run on every scan cycle: alignment,
//! feature derivation, model scoring and value detection.
//!
//! Run with: cargo bench --bench pipeline_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use value_bet_scanner::domain::aligner::RecordAligner;
use value_bet_scanner::domain::detector::{ScoredMatch, ValueDetector};
use value_bet_scanner::domain::features::derive_features;
use value_bet_scanner::domain::model::{
    BoostingParams, GradientBoostedClassifier, ProbabilityEstimator,
};
use value_bet_scanner::domain::records::{
    MatchRecord, OddsRecord, OutcomePrices, ShotCounts, StatsRecord, TeamPair,
};
use value_bet_scanner::domain::synthetic::{ShotsAndPriceRule, SyntheticConfig, TrainingSet};

const MATCHES: usize = 200;

fn batches() -> (Vec<OddsRecord>, Vec<StatsRecord>) {
    let mut odds = Vec::with_capacity(MATCHES);
    let mut stats = Vec::with_capacity(MATCHES);
    for i in 0..MATCHES {
        let teams = TeamPair::new(format!("Home {i}"), format!("Away {i}")).unwrap();
        let step = (i % 20) as f64 * 0.25;
        odds.push(OddsRecord::new(
            teams.clone(),
            OutcomePrices::new(1.5 + step, 3.2, 6.5 - step).unwrap(),
        ));
        stats.push(StatsRecord::new(
            teams,
            ShotCounts::new((i % 17) as u32 + 2, (i % 11) as u32 + 1),
        ));
    }
    stats.reverse();
    (odds, stats)
}

fn matches() -> Vec<MatchRecord> {
    let (odds, stats) = batches();
    RecordAligner::default().align(&odds, &stats).records
}

/// Benchmark the inner join of two 200-record batches.
fn bench_align(c: &mut Criterion) {
    let (odds, stats) = batches();
    let aligner = RecordAligner::default();

    c.bench_function("align_200", |b| {
        b.iter(|| aligner.align(black_box(&odds), black_box(&stats)));
    });
}

/// Benchmark feature derivation.
fn bench_features(c: &mut Criterion) {
    let records = matches();

    c.bench_function("derive_features_200", |b| {
        b.iter(|| derive_features(black_box(&records)));
    });
}

/// Benchmark scoring with the default-sized ensemble.
fn bench_predict(c: &mut Criterion) {
    let set = TrainingSet::synthetic(&SyntheticConfig::default(), &ShotsAndPriceRule::default())
        .unwrap();
    let model = GradientBoostedClassifier::train(&set, &BoostingParams::default()).unwrap();
    let features = derive_features(&matches());

    c.bench_function("predict_batch_200", |b| {
        b.iter(|| model.predict_batch(black_box(&features)));
    });
}

/// Benchmark thresholding and ranking.
fn bench_detect(c: &mut Criterion) {
    let records = matches();
    let scored: Vec<ScoredMatch<'_>> = records
        .iter()
        .enumerate()
        .map(|(i, record)| ScoredMatch {
            record,
            probability: (i % 10) as f64 / 10.0,
        })
        .collect();
    let detector = ValueDetector::default();

    c.bench_function("detect_200", |b| {
        b.iter(|| detector.detect(black_box(&scored)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_align,
    bench_features,
    bench_predict,
    bench_detect
);
criterion_main!(benches);
