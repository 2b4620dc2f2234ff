//! Match Source Adapters
//!
//! Concrete `OddsSource` / `StatsSource` implementations.

pub mod http_json;

pub use http_json::HttpJsonSource;
