//! Reference-grouped double-entry posting.
//!
//! This module implements the transaction posting engine:
//! - Ledger entry domain types and the entry status state machine
//! - The `TransactionGroup` aggregate (all legs sharing one reference number)
//! - Balance delta computation and posting policy checks
//! - Error types for posting operations
//!
//! # Modules
//!
//! - `types` - Entry types, statuses, account references
//! - `group` - The reference-group aggregate and its invariants
//! - `service` - Stateless transition validation and balance application
//! - `error` - Posting error taxonomy

pub mod error;
pub mod group;
pub mod service;
pub mod types;

#[cfg(test)]
mod group_props;
#[cfg(test)]
mod service_props;

pub use error::PostingError;
pub use group::{BalanceDelta, TransactionGroup};
pub use service::{AccountState, PostedBalance, PostingService, TransitionAction};
pub use types::{AccountRef, EntryStatus, EntryType, LedgerEntry, VerifierStamp};
