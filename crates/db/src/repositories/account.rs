//! Account repository for GL and member account operations.
//!
//! Balance rows are the only mutable shared state in the engine, so
//! every read that precedes a write happens through `lock_state`, which
//! takes a row-level exclusive lock inside the caller's transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use harambee_core::posting::{AccountRef, AccountState, PostingError};

use crate::entities::{account_types, gl_accounts, member_accounts};

/// Repository for account lookups, locking, and balance writes.
#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an account type by its exact name.
    ///
    /// # Errors
    ///
    /// Returns a database error on connection failure.
    pub async fn find_account_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<account_types::Model>, DbErr> {
        account_types::Entity::find()
            .filter(account_types::Column::Name.eq(name))
            .filter(account_types::Column::IsActive.eq(true))
            .one(&self.db)
            .await
    }

    /// Provisions a new member account under the given account type.
    ///
    /// Commits immediately; a later disbursement failure leaves the
    /// account behind for manual reconciliation.
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails.
    pub async fn provision_member_account(
        &self,
        member_id: Uuid,
        account_type_id: Uuid,
    ) -> Result<member_accounts::Model, DbErr> {
        let now = Utc::now();
        let account = member_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            member_id: Set(member_id),
            account_type_id: Set(account_type_id),
            account_number: Set(format!("MA-{}", Uuid::now_v7().simple())),
            available_balance: Set(rust_decimal::Decimal::ZERO),
            balance_floor: Set(rust_decimal::Decimal::ZERO),
            allow_overdraft: Set(false),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        account.insert(&self.db).await
    }

    /// Reads an account's posting state under an exclusive row lock.
    ///
    /// Must be called inside the transaction that will write the
    /// balance; callers lock accounts in a deterministic order to avoid
    /// deadlocks between concurrent groups.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for a missing row or `Database` on
    /// infrastructure failure.
    pub async fn lock_state(
        txn: &DatabaseTransaction,
        account: AccountRef,
    ) -> Result<AccountState, PostingError> {
        match account {
            AccountRef::Gl(id) => {
                let row = gl_accounts::Entity::find_by_id(id)
                    .lock_exclusive()
                    .one(txn)
                    .await
                    .map_err(|e| PostingError::Database(e.to_string()))?
                    .ok_or(PostingError::AccountNotFound(account))?;
                Ok(AccountState {
                    account,
                    available_balance: row.available_balance,
                    balance_floor: row.balance_floor,
                    allow_overdraft: row.allow_overdraft,
                    is_active: row.is_active,
                })
            }
            AccountRef::Member(id) => {
                let row = member_accounts::Entity::find_by_id(id)
                    .lock_exclusive()
                    .one(txn)
                    .await
                    .map_err(|e| PostingError::Database(e.to_string()))?
                    .ok_or(PostingError::AccountNotFound(account))?;
                Ok(AccountState {
                    account,
                    available_balance: row.available_balance,
                    balance_floor: row.balance_floor,
                    allow_overdraft: row.allow_overdraft,
                    is_active: row.is_active,
                })
            }
        }
    }

    /// Writes a new available balance for an account.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails.
    pub async fn write_balance(
        txn: &DatabaseTransaction,
        account: AccountRef,
        new_balance: rust_decimal::Decimal,
    ) -> Result<(), PostingError> {
        let now = Utc::now();
        match account {
            AccountRef::Gl(id) => {
                let update = gl_accounts::ActiveModel {
                    id: Set(id),
                    available_balance: Set(new_balance),
                    updated_at: Set(now.into()),
                    ..Default::default()
                };
                update
                    .update(txn)
                    .await
                    .map_err(|e| PostingError::Database(e.to_string()))?;
            }
            AccountRef::Member(id) => {
                let update = member_accounts::ActiveModel {
                    id: Set(id),
                    available_balance: Set(new_balance),
                    updated_at: Set(now.into()),
                    ..Default::default()
                };
                update
                    .update(txn)
                    .await
                    .map_err(|e| PostingError::Database(e.to_string()))?;
            }
        }
        Ok(())
    }
}
