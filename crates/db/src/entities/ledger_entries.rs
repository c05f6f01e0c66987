//! `SeaORM` Entity for `ledger_entries` table.
//!
//! Exactly one of `gl_account_id` / `member_account_id` is set per row;
//! the table carries a CHECK constraint enforcing the exclusivity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryStatus, EntryType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reference_number: String,
    pub gl_account_id: Option<Uuid>,
    pub member_account_id: Option<Uuid>,
    pub entry_type: EntryType,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub amount: Decimal,
    pub status: EntryStatus,
    pub verifier_remarks: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gl_accounts::Entity",
        from = "Column::GlAccountId",
        to = "super::gl_accounts::Column::Id"
    )]
    GlAccounts,
    #[sea_orm(
        belongs_to = "super::member_accounts::Entity",
        from = "Column::MemberAccountId",
        to = "super::member_accounts::Column::Id"
    )]
    MemberAccounts,
}

impl Related<super::gl_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlAccounts.def()
    }
}

impl Related<super::member_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
