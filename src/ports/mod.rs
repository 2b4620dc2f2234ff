//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `OddsSource` / `StatsSource`: upstream raw match data
//! - `AlertNotifier`: downstream value bet delivery
//! - `CycleObserver`: per-cycle telemetry

pub mod match_source;
pub mod notifier;
pub mod telemetry;
