//! Posting repository for ledger entry groups.
//!
//! Owns the per-reference critical section: loading a group, gating the
//! status transition, applying balance deltas, and persisting the new
//! status happen inside one database transaction with the group's rows
//! and account rows locked FOR UPDATE. Validation reads outside a lock
//! are always re-run inside it before anything is written.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use harambee_core::batch::{dedup_preserving_order, BatchOutcome};
use harambee_core::posting::{
    AccountRef, EntryStatus, EntryType, LedgerEntry, PostingError, PostingService,
    TransactionGroup,
};

use crate::entities::ledger_entries;

use super::account::AccountRepository;

/// Input for one leg of a new posting group.
#[derive(Debug, Clone)]
pub struct CreateLegInput {
    /// Account the leg posts against.
    pub account: AccountRef,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount at cent precision.
    pub amount: Decimal,
}

/// Input for creating a pending posting group.
#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    /// Reference number shared by every leg.
    pub reference_number: String,
    /// Legs of the group.
    pub legs: Vec<CreateLegInput>,
    /// Maker recording the group.
    pub created_by: Uuid,
}

/// Repository for reference-grouped ledger operations.
#[derive(Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads and validates the group for a reference number. Read-only.
    ///
    /// # Errors
    ///
    /// Returns `GroupEmpty`, `Unbalanced`, or `MixedStatus` per the
    /// group invariants, or `Database` on infrastructure failure.
    pub async fn load_group(&self, reference: &str) -> Result<TransactionGroup, PostingError> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ReferenceNumber.eq(reference))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        build_group(reference, models)
    }

    /// Records a new pending group after validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns the group-invariant errors, `PostingFailed` when the
    /// reference is already in use, or `Database`.
    pub async fn create_group(
        &self,
        input: CreateGroupInput,
    ) -> Result<TransactionGroup, PostingError> {
        let now = Utc::now();
        let entries: Vec<LedgerEntry> = input
            .legs
            .iter()
            .map(|leg| LedgerEntry {
                id: Uuid::now_v7(),
                reference_number: input.reference_number.clone(),
                account: leg.account,
                entry_type: leg.entry_type,
                amount: leg.amount,
                status: EntryStatus::Pending,
                verifier_remarks: None,
                created_by: input.created_by,
                created_at: now,
            })
            .collect();
        let group = TransactionGroup::try_new(&input.reference_number, entries)?;

        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ReferenceNumber.eq(&input.reference_number))
            .limit(1)
            .all(&txn)
            .await
            .map_err(map_db_err)?;
        if !existing.is_empty() {
            return Err(PostingError::PostingFailed {
                reference: input.reference_number,
                reason: "reference number is already in use".into(),
            });
        }

        for entry in group.entries() {
            to_active_model(entry).insert(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(group)
    }

    /// Transitions a reference group to a terminal status.
    ///
    /// Runs the full critical section: locks the group's rows, re-reads
    /// the status, validates the transition, applies balance deltas on
    /// approval (all-or-nothing), and stamps the verifier fields. Two
    /// calls racing on the same reference serialize here; the loser
    /// re-reads a terminal status and gets `InvalidTransition`.
    ///
    /// # Errors
    ///
    /// Group-invariant errors, `InvalidTransition` on a lost race or a
    /// terminal group, account and balance-policy errors on approval,
    /// or `Database` when the outcome is unknown.
    pub async fn transition_reference(
        &self,
        reference: &str,
        target: EntryStatus,
        remarks: Option<String>,
        actor: Uuid,
    ) -> Result<TransactionGroup, PostingError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ReferenceNumber.eq(reference))
            .order_by_asc(ledger_entries::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(map_db_err)?;
        let group = build_group(reference, models.clone())?;

        let action = PostingService::transition(&group, target, remarks, actor)?;

        if action.posts_balances() {
            Self::post_balances(&txn, &group).await?;
        }

        let stamp = action.stamp();
        let now = Utc::now();
        for model in models {
            let mut row = model.into_active_model();
            row.status = Set(target.into());
            row.verifier_remarks = Set(stamp.remarks.clone());
            row.verified_by = Set(Some(stamp.verified_by));
            row.verified_at = Set(Some(stamp.verified_at.into()));
            row.updated_at = Set(now.into());
            row.update(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        self.load_group(reference).await
    }

    /// Transitions the whole group that contains a single entry.
    ///
    /// The group is the unit of approval; operating on one entry id
    /// always expands to its reference siblings.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` for an unknown id, otherwise as
    /// [`Self::transition_reference`].
    pub async fn transition_entry(
        &self,
        entry_id: Uuid,
        target: EntryStatus,
        remarks: Option<String>,
        actor: Uuid,
    ) -> Result<TransactionGroup, PostingError> {
        let entry = ledger_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(PostingError::EntryNotFound(entry_id))?;
        self.transition_reference(&entry.reference_number, target, remarks, actor)
            .await
    }

    /// Maps entry ids to their distinct reference numbers, preserving
    /// first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `Database` on infrastructure failure. Unknown ids are
    /// returned separately so bulk callers can report them per-item.
    pub async fn resolve_references(
        &self,
        entry_ids: &[Uuid],
    ) -> Result<(Vec<String>, Vec<Uuid>), PostingError> {
        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Id.is_in(entry_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let by_id: std::collections::HashMap<Uuid, String> = models
            .into_iter()
            .map(|m| (m.id, m.reference_number))
            .collect();

        let mut references = Vec::new();
        let mut missing = Vec::new();
        for id in dedup_preserving_order(entry_ids.to_vec()) {
            match by_id.get(&id) {
                Some(reference) => references.push(reference.clone()),
                None => missing.push(id),
            }
        }
        Ok((dedup_preserving_order(references), missing))
    }

    /// Bulk status transition over a caller-selected set of entry ids.
    ///
    /// Deduplicates the selection down to distinct reference numbers
    /// first, then processes each reference independently; one group's
    /// failure never aborts the rest.
    ///
    /// # Errors
    ///
    /// Returns `Database` only if the initial id resolution fails;
    /// per-reference failures land in the outcome instead.
    pub async fn bulk_transition(
        &self,
        entry_ids: &[Uuid],
        target: EntryStatus,
        remarks: Option<String>,
        actor: Uuid,
    ) -> Result<BatchOutcome<String>, PostingError> {
        let (references, missing) = self.resolve_references(entry_ids).await?;

        let mut outcome = BatchOutcome::new();
        for id in missing {
            outcome.record_error(id.to_string(), &PostingError::EntryNotFound(id));
        }
        for reference in references {
            match self
                .transition_reference(&reference, target, remarks.clone(), actor)
                .await
            {
                Ok(_) => outcome.record_success(reference),
                Err(error) => {
                    if error.is_uncertain() {
                        tracing::error!(
                            reference = %reference,
                            error = %error,
                            "bulk transition outcome unknown, needs reconciliation"
                        );
                    }
                    outcome.record_error(reference, &error);
                }
            }
        }
        Ok(outcome)
    }

    /// Applies a validated group's balance deltas inside the caller's
    /// transaction. Accounts are locked in a deterministic order so
    /// concurrent groups touching the same accounts cannot deadlock.
    pub(crate) async fn post_balances(
        txn: &DatabaseTransaction,
        group: &TransactionGroup,
    ) -> Result<(), PostingError> {
        let mut deltas = group.balance_deltas();
        deltas.sort_by_key(|d| (matches!(d.account, AccountRef::Member(_)), d.account.id()));

        let mut states = std::collections::HashMap::new();
        for delta in &deltas {
            let state = AccountRepository::lock_state(txn, delta.account).await?;
            states.insert(delta.account, state);
        }

        let posted = PostingService::apply_approval(group, |account| {
            states
                .get(&account)
                .cloned()
                .ok_or(PostingError::AccountNotFound(account))
        })?;

        for balance in posted {
            AccountRepository::write_balance(txn, balance.account, balance.new_balance).await?;
        }
        Ok(())
    }
}

fn map_db_err(err: DbErr) -> PostingError {
    PostingError::Database(err.to_string())
}

fn build_group(
    reference: &str,
    models: Vec<ledger_entries::Model>,
) -> Result<TransactionGroup, PostingError> {
    let entries = models
        .into_iter()
        .map(to_domain)
        .collect::<Result<Vec<_>, _>>()?;
    TransactionGroup::try_new(reference, entries)
}

fn to_domain(model: ledger_entries::Model) -> Result<LedgerEntry, PostingError> {
    let account = match (model.gl_account_id, model.member_account_id) {
        (Some(id), None) => AccountRef::Gl(id),
        (None, Some(id)) => AccountRef::Member(id),
        // unreachable under the table's CHECK constraint
        _ => {
            return Err(PostingError::Database(format!(
                "ledger entry {} has an invalid account pairing",
                model.id
            )));
        }
    };
    Ok(LedgerEntry {
        id: model.id,
        reference_number: model.reference_number,
        account,
        entry_type: model.entry_type.into(),
        amount: model.amount,
        status: model.status.into(),
        verifier_remarks: model.verifier_remarks,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn to_active_model(entry: &LedgerEntry) -> ledger_entries::ActiveModel {
    let (gl_account_id, member_account_id) = match entry.account {
        AccountRef::Gl(id) => (Some(id), None),
        AccountRef::Member(id) => (None, Some(id)),
    };
    ledger_entries::ActiveModel {
        id: Set(entry.id),
        reference_number: Set(entry.reference_number.clone()),
        gl_account_id: Set(gl_account_id),
        member_account_id: Set(member_account_id),
        entry_type: Set(entry.entry_type.into()),
        amount: Set(entry.amount),
        status: Set(entry.status.into()),
        verifier_remarks: Set(entry.verifier_remarks.clone()),
        verified_by: Set(None),
        verified_at: Set(None),
        created_by: Set(entry.created_by),
        created_at: Set(entry.created_at.into()),
        updated_at: Set(entry.created_at.into()),
    }
}
