//! `SeaORM` Entity for `loan_applications` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LoanStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub application_number: String,
    pub member_id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub loan_amount: Decimal,
    pub status: LoanStatus,
    pub disbursed_account_id: Option<Uuid>,
    pub disbursement_reference: Option<String>,
    pub disbursed_by: Option<Uuid>,
    pub disbursed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::loan_products::Entity",
        from = "Column::ProductId",
        to = "super::loan_products::Column::Id"
    )]
    LoanProducts,
    #[sea_orm(
        belongs_to = "super::member_accounts::Entity",
        from = "Column::DisbursedAccountId",
        to = "super::member_accounts::Column::Id"
    )]
    MemberAccounts,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::loan_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanProducts.def()
    }
}

impl Related<super::member_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
