//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, Telegram, Prometheus). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `sources`: JSON-over-HTTP odds and stats sources
//! - `notify`: Telegram and log-only alert sinks
//! - `metrics`: Prometheus metrics export

pub mod metrics;
pub mod notify;
pub mod sources;
