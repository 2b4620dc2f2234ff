//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the scanner's workflows.
//!
//! Use cases:
//! - `ingest`: Raw source batches to validated records
//! - `ValueScanner`: One fetch-align-score-detect-notify cycle
//! - `CycleScheduler`: Fixed-interval, non-overlapping cycle loop

pub mod ingest;
pub mod scheduler;
pub mod value_scanner;
