//! Loan repository for disbursement operations.
//!
//! Drives the Sanctioned -> Disbursed flow: eligibility reads happen
//! outside any lock, then the application row is re-checked FOR UPDATE
//! in the same transaction that inserts the funding legs and moves the
//! balances. Account provisioning commits before that transaction, so a
//! mid-flight failure can leave an unused loan account behind; it is
//! logged for reconciliation rather than rolled back.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use harambee_core::batch::{dedup_preserving_order, BatchOutcome};
use harambee_core::disbursement::{
    DisbursementError, DisbursementOutcome, DisbursementService, LoanApplication, LoanProduct,
};
use harambee_shared::types::{LoanApplicationId, MemberId, ProductId};

use crate::entities::{loan_applications, loan_products, sea_orm_active_enums};

use super::account::AccountRepository;
use super::posting::{self, PostingRepository};

/// Repository for loan application disbursement.
#[derive(Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
    accounts: AccountRepository,
}

impl LoanRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let accounts = AccountRepository::new(db.clone());
        Self { db, accounts }
    }

    /// Fetches an application in domain form.
    ///
    /// # Errors
    ///
    /// `ApplicationNotFound` or `Database`.
    pub async fn get_application(
        &self,
        application_id: Uuid,
    ) -> Result<LoanApplication, DisbursementError> {
        let model = loan_applications::Entity::find_by_id(application_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(DisbursementError::ApplicationNotFound(application_id))?;
        Ok(to_domain_application(model))
    }

    /// Disburses a sanctioned application: provisions the loan account,
    /// posts the funding legs, and marks the application Disbursed.
    ///
    /// # Errors
    ///
    /// `NotSanctioned`, `AccountTypeMissing`, `ProvisioningFailed`,
    /// posting errors from the funding group, or `Database` when the
    /// outcome is unknown.
    pub async fn disburse(
        &self,
        application_id: Uuid,
        actor: Uuid,
    ) -> Result<DisbursementOutcome, DisbursementError> {
        let application = self.get_application(application_id).await?;
        DisbursementService::validate_sanctioned(&application)?;

        let product_id = application.product_id.into_inner();
        let product_model = loan_products::Entity::find_by_id(product_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(DisbursementError::ProductNotFound(product_id))?;
        let product = LoanProduct {
            id: ProductId::from_uuid(product_model.id),
            name: product_model.name,
            funding_gl_account_id: product_model.funding_gl_account_id,
        };

        let type_name = DisbursementService::expected_account_type_name(&product.name);
        let account_type = self
            .accounts
            .find_account_type_by_name(&type_name)
            .await
            .map_err(map_db_err)?
            .ok_or(DisbursementError::AccountTypeMissing { name: type_name })?;

        let loan_account = self
            .accounts
            .provision_member_account(application.member_id.into_inner(), account_type.id)
            .await
            .map_err(|e| DisbursementError::ProvisioningFailed {
                application_id,
                reason: e.to_string(),
            })?;

        let reference = DisbursementService::generate_reference();
        let group = DisbursementService::build_funding_group(
            &application,
            &product,
            loan_account.id,
            &reference,
            actor,
        )?;

        match self
            .post_disbursement(application_id, &group, loan_account.id, &reference, actor)
            .await
        {
            Ok(()) => Ok(DisbursementOutcome {
                application_id,
                created_account_id: loan_account.id,
                reference_number: reference,
                amount: application.loan_amount,
            }),
            Err(error) => {
                // the provisioned account survives for manual reconciliation
                tracing::warn!(
                    application_id = %application_id,
                    account_id = %loan_account.id,
                    reference = %reference,
                    error = %error,
                    "disbursement failed after account provisioning"
                );
                Err(error)
            }
        }
    }

    /// Bulk disbursement; each application is processed independently.
    ///
    /// # Errors
    ///
    /// Never fails as a whole; per-application failures land in the
    /// outcome.
    pub async fn bulk_disburse(
        &self,
        application_ids: &[Uuid],
        actor: Uuid,
    ) -> BatchOutcome<Uuid> {
        let mut outcome = BatchOutcome::new();
        for application_id in dedup_preserving_order(application_ids.to_vec()) {
            match self.disburse(application_id, actor).await {
                Ok(_) => outcome.record_success(application_id),
                Err(error) => {
                    if error.is_uncertain() {
                        tracing::error!(
                            application_id = %application_id,
                            error = %error,
                            "bulk disbursement outcome unknown, needs reconciliation"
                        );
                    }
                    outcome.record_error(application_id, &error);
                }
            }
        }
        outcome
    }

    /// The transactional tail of a disbursement: re-check the
    /// application under lock, insert the funding legs, post balances,
    /// and mark the application Disbursed.
    async fn post_disbursement(
        &self,
        application_id: Uuid,
        group: &harambee_core::posting::TransactionGroup,
        loan_account_id: Uuid,
        reference: &str,
        actor: Uuid,
    ) -> Result<(), DisbursementError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let locked = loan_applications::Entity::find_by_id(application_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(DisbursementError::ApplicationNotFound(application_id))?;
        if locked.status != sea_orm_active_enums::LoanStatus::Sanctioned {
            return Err(DisbursementError::NotSanctioned {
                application_id,
                status: locked.status.into(),
            });
        }

        for entry in group.entries() {
            posting::to_active_model(entry)
                .insert(&txn)
                .await
                .map_err(map_db_err)?;
        }

        PostingRepository::post_balances(&txn, group).await?;

        let now = Utc::now();
        let update = loan_applications::ActiveModel {
            id: Set(application_id),
            status: Set(sea_orm_active_enums::LoanStatus::Disbursed),
            disbursed_account_id: Set(Some(loan_account_id)),
            disbursement_reference: Set(Some(reference.to_owned())),
            disbursed_by: Set(Some(actor)),
            disbursed_at: Set(Some(now.into())),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        update.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        Ok(())
    }
}

fn map_db_err(err: sea_orm::DbErr) -> DisbursementError {
    DisbursementError::Database(err.to_string())
}

fn to_domain_application(model: loan_applications::Model) -> LoanApplication {
    LoanApplication {
        id: LoanApplicationId::from_uuid(model.id),
        application_number: model.application_number,
        member_id: MemberId::from_uuid(model.member_id),
        product_id: ProductId::from_uuid(model.product_id),
        loan_amount: model.loan_amount,
        status: model.status.into(),
    }
}
