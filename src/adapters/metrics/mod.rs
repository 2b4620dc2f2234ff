//! Metrics Adapters
//!
//! Prometheus export of per-cycle scanner metrics via axum 0.7.

pub mod prometheus;

pub use prometheus::ScanMetrics;
