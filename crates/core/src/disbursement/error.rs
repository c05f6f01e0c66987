//! Disbursement error types.

use thiserror::Error;
use uuid::Uuid;

use crate::posting::PostingError;

use super::types::LoanStatus;

/// Errors produced by the disbursement orchestrator.
#[derive(Debug, Error)]
pub enum DisbursementError {
    /// Application does not exist.
    #[error("Loan application not found: {0}")]
    ApplicationNotFound(Uuid),

    /// Application is not in the Sanctioned state.
    #[error("Loan application {application_id} is {status}, expected sanctioned")]
    NotSanctioned {
        /// Application ID.
        application_id: Uuid,
        /// Status actually observed.
        status: LoanStatus,
    },

    /// Loan amount is zero, negative, or carries sub-cent precision.
    #[error("Invalid loan amount on application {0}")]
    InvalidLoanAmount(Uuid),

    /// Product referenced by the application does not exist.
    #[error("Loan product not found: {0}")]
    ProductNotFound(Uuid),

    /// No account type matches the product's derived name. Indicates
    /// missing configuration; never retried.
    #[error("No account type named '{name}' exists for this product")]
    AccountTypeMissing {
        /// The derived account-type name that failed to resolve.
        name: String,
    },

    /// The loan account could not be provisioned.
    #[error("Failed to provision loan account for application {application_id}: {reason}")]
    ProvisioningFailed {
        /// Application ID.
        application_id: Uuid,
        /// Collaborator-supplied reason.
        reason: String,
    },

    /// Building or posting the funding ledger group failed.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Infrastructure failure with an unknown outcome.
    #[error("Database error: {0}")]
    Database(String),
}

impl DisbursementError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::NotSanctioned { .. } => "NOT_SANCTIONED",
            Self::InvalidLoanAmount(_) => "INVALID_LOAN_AMOUNT",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::AccountTypeMissing { .. } => "ACCOUNT_TYPE_MISSING",
            Self::ProvisioningFailed { .. } => "PROVISIONING_FAILED",
            Self::Posting(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status for surfacing this error through the API layer.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ApplicationNotFound(_) | Self::ProductNotFound(_) => 404,
            Self::InvalidLoanAmount(_) => 400,
            Self::NotSanctioned { .. }
            | Self::AccountTypeMissing { .. }
            | Self::ProvisioningFailed { .. } => 422,
            Self::Posting(inner) => inner.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Whether the outcome is unknown and needs manual reconciliation,
    /// as opposed to a clean refusal.
    #[must_use]
    pub fn is_uncertain(&self) -> bool {
        match self {
            Self::Database(_) => true,
            Self::Posting(inner) => inner.is_uncertain(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_status() {
        let err = DisbursementError::NotSanctioned {
            application_id: Uuid::now_v7(),
            status: LoanStatus::Disbursed,
        };
        assert_eq!(err.error_code(), "NOT_SANCTIONED");
        assert_eq!(err.http_status_code(), 422);
        assert!(!err.is_uncertain());

        let err = DisbursementError::AccountTypeMissing {
            name: "Emergency Loan Account".into(),
        };
        assert_eq!(err.error_code(), "ACCOUNT_TYPE_MISSING");
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn test_uncertainty_follows_posting_errors() {
        let err = DisbursementError::Posting(PostingError::Database("timeout".into()));
        assert!(err.is_uncertain());
        assert_eq!(err.http_status_code(), 500);

        let err = DisbursementError::Database("connection reset".into());
        assert!(err.is_uncertain());
    }
}
