//! Loan disbursement orchestration.
//!
//! Converts a sanctioned loan application into a funded loan account:
//! derives the product's account type, provisions the member account,
//! and builds the funding ledger group that moves money from the
//! product's funding GL account into the new loan account.

pub mod error;
pub mod service;
pub mod types;

pub use error::DisbursementError;
pub use service::{DisbursementOutcome, DisbursementService};
pub use types::{LoanApplication, LoanProduct, LoanStatus};
