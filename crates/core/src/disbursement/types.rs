//! Loan domain types used by the disbursement flow.

use harambee_shared::types::{LoanApplicationId, MemberId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a loan application.
///
/// Origination and appraisal produce the earlier states; this engine
/// only performs the Sanctioned -> Disbursed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Awaiting appraisal.
    PendingAppraisal,
    /// Appraisal approved, awaiting fund disbursement.
    Sanctioned,
    /// Approved but not yet sanctioned for funds.
    Approved,
    /// Rejected during appraisal.
    Rejected,
    /// Funds released; terminal.
    Disbursed,
}

impl LoanStatus {
    /// Canonical database string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAppraisal => "pending_appraisal",
            Self::Sanctioned => "sanctioned",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Disbursed => "disbursed",
        }
    }

    /// Parses a database status string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending_appraisal" => Some(Self::PendingAppraisal),
            "sanctioned" => Some(Self::Sanctioned),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "disbursed" => Some(Self::Disbursed),
            _ => None,
        }
    }

    /// Only sanctioned applications may be disbursed.
    #[must_use]
    pub const fn can_disburse(&self) -> bool {
        matches!(self, Self::Sanctioned)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan product as seen by the disbursement flow.
#[derive(Debug, Clone)]
pub struct LoanProduct {
    /// Product ID.
    pub id: ProductId,
    /// Product display name; drives account-type derivation.
    pub name: String,
    /// GL account that funds disbursements of this product.
    pub funding_gl_account_id: Uuid,
}

/// The slice of a loan application the disbursement flow needs.
#[derive(Debug, Clone)]
pub struct LoanApplication {
    /// Application ID.
    pub id: LoanApplicationId,
    /// Human-facing application number.
    pub application_number: String,
    /// Borrowing member.
    pub member_id: MemberId,
    /// Product applied for.
    pub product_id: ProductId,
    /// Principal to release on disbursement.
    pub loan_amount: Decimal,
    /// Current lifecycle status.
    pub status: LoanStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            LoanStatus::PendingAppraisal,
            LoanStatus::Sanctioned,
            LoanStatus::Approved,
            LoanStatus::Rejected,
            LoanStatus::Disbursed,
        ] {
            assert_eq!(LoanStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LoanStatus::parse("funded"), None);
    }

    #[test]
    fn test_only_sanctioned_can_disburse() {
        assert!(LoanStatus::Sanctioned.can_disburse());
        assert!(!LoanStatus::PendingAppraisal.can_disburse());
        assert!(!LoanStatus::Approved.can_disburse());
        assert!(!LoanStatus::Rejected.can_disburse());
        assert!(!LoanStatus::Disbursed.can_disburse());
    }
}
