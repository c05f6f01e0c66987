//! Posting error taxonomy.
//!
//! Validation failures are deterministic and never retried; a lost race
//! surfaces as `InvalidTransition`; database failures mid-mutation are an
//! uncertain outcome and must be reported distinctly so operators can
//! reconcile.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{AccountRef, EntryStatus};

/// Errors that can occur during posting operations.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Group Validation Errors ==========
    /// No entries share the given reference number.
    #[error("No ledger entries found for reference {0}")]
    GroupEmpty(String),

    /// Debit and credit sums differ within the group.
    #[error("Reference {reference} is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// The reference number of the group.
        reference: String,
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Entries in the group do not share one status (prior partial update).
    #[error("Reference {0} has entries in mixed statuses")]
    MixedStatus(String),

    /// A leg carries a different reference number than its group.
    #[error("Entry {entry_id} carries reference {found}, expected {expected}")]
    ReferenceMismatch {
        /// The stray entry.
        entry_id: uuid::Uuid,
        /// The reference number on the stray entry.
        found: String,
        /// The reference number of the group.
        expected: String,
    },

    /// An entry amount is zero, negative, or carries sub-cent precision.
    #[error("Entry {0} has an invalid amount")]
    InvalidAmount(uuid::Uuid),

    // ========== State Machine Errors ==========
    /// The group is not in a state that allows the requested transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current group status.
        from: EntryStatus,
        /// The attempted target status.
        to: EntryStatus,
    },

    // ========== Balance Posting Errors ==========
    /// An account referenced by a leg does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountRef),

    /// An account referenced by a leg is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountRef),

    /// Approving the group would fail a balance policy; nothing was posted.
    #[error("Posting failed for reference {reference}: {reason}")]
    PostingFailed {
        /// The reference number of the group.
        reference: String,
        /// Why the posting was refused.
        reason: String,
    },

    /// A debit would take the account below its balance floor.
    #[error(
        "Debit of {amount} on account {account} would breach balance floor {floor} (available: {available})"
    )]
    BalanceFloorBreached {
        /// The account the debit targets.
        account: AccountRef,
        /// The debit amount.
        amount: Decimal,
        /// The account's available balance.
        available: Decimal,
        /// The configured floor.
        floor: Decimal,
    },

    // ========== Infrastructure Errors ==========
    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(uuid::Uuid),

    /// Database error; the outcome of an in-flight mutation is unknown.
    #[error("Database error: {0}")]
    Database(String),
}

impl PostingError {
    /// Returns the error code for API responses and batch reasons.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::GroupEmpty(_) => "GROUP_EMPTY",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::MixedStatus(_) => "MIXED_STATUS",
            Self::ReferenceMismatch { .. } => "REFERENCE_MISMATCH",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::PostingFailed { .. } => "POSTING_FAILED",
            Self::BalanceFloorBreached { .. } => "BALANCE_FLOOR_BREACHED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - deterministic validation failures
            Self::GroupEmpty(_)
            | Self::Unbalanced { .. }
            | Self::MixedStatus(_)
            | Self::ReferenceMismatch { .. }
            | Self::InvalidAmount(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::EntryNotFound(_) => 404,

            // 409 Conflict - lost a race or state does not allow it
            Self::InvalidTransition { .. } => 409,

            // 422 Unprocessable - policy refused the posting
            Self::AccountInactive(_)
            | Self::PostingFailed { .. }
            | Self::BalanceFloorBreached { .. } => 422,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the outcome of the operation is unknown.
    ///
    /// A database failure mid-mutation may or may not have taken effect;
    /// callers must surface it as an uncertain outcome for manual
    /// reconciliation, never as a clean failure.
    #[must_use]
    pub const fn is_uncertain(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PostingError::GroupEmpty("TXN-1".into()).error_code(),
            "GROUP_EMPTY"
        );
        assert_eq!(
            PostingError::Unbalanced {
                reference: "TXN-1".into(),
                debit: dec!(100),
                credit: dec!(50),
            }
            .error_code(),
            "UNBALANCED"
        );
        assert_eq!(
            PostingError::MixedStatus("TXN-1".into()).error_code(),
            "MIXED_STATUS"
        );
        assert_eq!(
            PostingError::InvalidTransition {
                from: EntryStatus::Approved,
                to: EntryStatus::Approved,
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            PostingError::GroupEmpty("TXN-1".into()).http_status_code(),
            400
        );
        assert_eq!(
            PostingError::AccountNotFound(AccountRef::Gl(Uuid::nil())).http_status_code(),
            404
        );
        assert_eq!(
            PostingError::InvalidTransition {
                from: EntryStatus::Approved,
                to: EntryStatus::Approved,
            }
            .http_status_code(),
            409
        );
        assert_eq!(
            PostingError::Database("boom".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_uncertain_classification() {
        assert!(PostingError::Database("conn reset".into()).is_uncertain());
        assert!(!PostingError::GroupEmpty("TXN-1".into()).is_uncertain());
        assert!(
            !PostingError::InvalidTransition {
                from: EntryStatus::Approved,
                to: EntryStatus::Approved,
            }
            .is_uncertain()
        );
    }

    #[test]
    fn test_unbalanced_display() {
        let err = PostingError::Unbalanced {
            reference: "TXN-42".into(),
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Reference TXN-42 is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }
}
