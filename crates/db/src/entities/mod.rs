//! `SeaORM` entity definitions.

pub mod account_types;
pub mod gl_accounts;
pub mod ledger_entries;
pub mod loan_applications;
pub mod loan_products;
pub mod member_accounts;
pub mod members;
pub mod sea_orm_active_enums;
