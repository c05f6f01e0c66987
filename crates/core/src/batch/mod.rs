//! Batch execution with partial-failure reporting.

pub mod runner;

pub use runner::{dedup_preserving_order, BatchFailure, BatchOutcome, Uncertainty};
