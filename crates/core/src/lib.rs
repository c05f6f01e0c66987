//! Core business logic for Harambee.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state machines live here.
//!
//! # Modules
//!
//! - `posting` - Reference-grouped double-entry posting and the approval state machine
//! - `disbursement` - Loan disbursement orchestration rules
//! - `batch` - Partial-failure aggregation for bulk operations

pub mod batch;
pub mod disbursement;
pub mod posting;
