//! Stateless disbursement orchestration logic.
//!
//! The pure half of the disbursement flow: status gating, account-type
//! name derivation, reference generation, and construction of the
//! funding ledger group. Persistence and account provisioning live in
//! the repository layer, which calls these in order.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use harambee_shared::types::money;

use crate::posting::{AccountRef, EntryStatus, EntryType, LedgerEntry, TransactionGroup};

use super::error::DisbursementError;
use super::types::{LoanApplication, LoanProduct};

/// Record of a completed disbursement.
#[derive(Debug, Clone)]
pub struct DisbursementOutcome {
    /// The disbursed application.
    pub application_id: Uuid,
    /// The loan account created to receive the funds.
    pub created_account_id: Uuid,
    /// Reference number linking the funding legs.
    pub reference_number: String,
    /// Principal released.
    pub amount: Decimal,
}

/// Stateless engine for the Sanctioned -> Disbursed transition.
pub struct DisbursementService;

impl DisbursementService {
    /// Derives the account-type name a product's loan accounts use.
    #[must_use]
    pub fn expected_account_type_name(product_name: &str) -> String {
        format!("{product_name} Account")
    }

    /// Generates a fresh disbursement reference number.
    #[must_use]
    pub fn generate_reference() -> String {
        format!("DSB-{}", Uuid::now_v7().simple())
    }

    /// Checks the application is eligible for disbursement.
    ///
    /// # Errors
    ///
    /// - `NotSanctioned` if the application is in any other state
    /// - `InvalidLoanAmount` if the principal is not a positive amount
    ///   at cent precision
    pub fn validate_sanctioned(application: &LoanApplication) -> Result<(), DisbursementError> {
        if !application.status.can_disburse() {
            return Err(DisbursementError::NotSanctioned {
                application_id: application.id.into_inner(),
                status: application.status,
            });
        }
        let valid = money::to_minor_units(application.loan_amount)
            .is_some_and(|minor| minor > 0);
        if !valid {
            return Err(DisbursementError::InvalidLoanAmount(
                application.id.into_inner(),
            ));
        }
        Ok(())
    }

    /// Builds the balanced funding group for a disbursement: a DEBIT
    /// from the product's funding GL account and a CREDIT into the new
    /// loan account, sharing one reference number.
    ///
    /// The legs are born Approved; disbursement posts funds immediately
    /// rather than queueing for verifier approval.
    ///
    /// # Errors
    ///
    /// Returns a posting error if the group fails its own invariants.
    pub fn build_funding_group(
        application: &LoanApplication,
        product: &LoanProduct,
        loan_account_id: Uuid,
        reference: &str,
        actor: Uuid,
    ) -> Result<TransactionGroup, DisbursementError> {
        let now = Utc::now();
        let entries = vec![
            LedgerEntry {
                id: Uuid::now_v7(),
                reference_number: reference.to_owned(),
                account: AccountRef::Gl(product.funding_gl_account_id),
                entry_type: EntryType::Debit,
                amount: application.loan_amount,
                status: EntryStatus::Approved,
                verifier_remarks: None,
                created_by: actor,
                created_at: now,
            },
            LedgerEntry {
                id: Uuid::now_v7(),
                reference_number: reference.to_owned(),
                account: AccountRef::Member(loan_account_id),
                entry_type: EntryType::Credit,
                amount: application.loan_amount,
                status: EntryStatus::Approved,
                verifier_remarks: None,
                created_by: actor,
                created_at: now,
            },
        ];
        Ok(TransactionGroup::try_new(reference, entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::BalanceDelta;
    use harambee_shared::types::{LoanApplicationId, MemberId, ProductId};
    use rust_decimal_macros::dec;

    fn sanctioned_application(amount: Decimal) -> LoanApplication {
        LoanApplication {
            id: LoanApplicationId::new(),
            application_number: "LN-2026-0042".into(),
            member_id: MemberId::new(),
            product_id: ProductId::new(),
            loan_amount: amount,
            status: super::super::types::LoanStatus::Sanctioned,
        }
    }

    fn product() -> LoanProduct {
        LoanProduct {
            id: ProductId::new(),
            name: "Emergency Loan".into(),
            funding_gl_account_id: Uuid::now_v7(),
        }
    }

    #[test]
    fn test_account_type_name_derivation() {
        assert_eq!(
            DisbursementService::expected_account_type_name("Emergency Loan"),
            "Emergency Loan Account"
        );
    }

    #[test]
    fn test_generated_references_are_unique_and_prefixed() {
        let a = DisbursementService::generate_reference();
        let b = DisbursementService::generate_reference();
        assert!(a.starts_with("DSB-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_rejects_non_sanctioned() {
        let mut app = sanctioned_application(dec!(5000));
        app.status = super::super::types::LoanStatus::Disbursed;
        let err = DisbursementService::validate_sanctioned(&app).unwrap_err();
        assert!(matches!(err, DisbursementError::NotSanctioned { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_amounts() {
        for amount in [dec!(0), dec!(-100), dec!(10.005)] {
            let app = sanctioned_application(amount);
            let err = DisbursementService::validate_sanctioned(&app).unwrap_err();
            assert!(matches!(err, DisbursementError::InvalidLoanAmount(_)));
        }
        let app = sanctioned_application(dec!(5000));
        assert!(DisbursementService::validate_sanctioned(&app).is_ok());
    }

    #[test]
    fn test_funding_group_is_balanced_and_approved() {
        let app = sanctioned_application(dec!(5000));
        let product = product();
        let loan_account = Uuid::now_v7();
        let reference = DisbursementService::generate_reference();

        let group = DisbursementService::build_funding_group(
            &app,
            &product,
            loan_account,
            &reference,
            Uuid::now_v7(),
        )
        .unwrap();

        assert_eq!(group.status(), EntryStatus::Approved);
        assert_eq!(group.entries().len(), 2);
        assert_eq!(group.total(), dec!(5000));

        let deltas = group.balance_deltas();
        assert!(deltas.contains(&BalanceDelta {
            account: AccountRef::Gl(product.funding_gl_account_id),
            net: dec!(-5000),
        }));
        assert!(deltas.contains(&BalanceDelta {
            account: AccountRef::Member(loan_account),
            net: dec!(5000),
        }));
    }
}
