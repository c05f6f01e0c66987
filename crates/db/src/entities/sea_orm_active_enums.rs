//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use harambee_core::disbursement::LoanStatus as DomainLoanStatus;
use harambee_core::posting::{EntryStatus as DomainEntryStatus, EntryType as DomainEntryType};

/// Debit or credit side of a ledger leg.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum EntryType {
    /// Decreases the account's available balance.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Increases the account's available balance.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Approval status shared by every leg of a reference group.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    /// Awaiting verifier action.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Posted to balances; terminal.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Sent back to the maker; terminal.
    #[sea_orm(string_value = "returned")]
    Returned,
    /// Refused; terminal.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Loan application lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
pub enum LoanStatus {
    /// Awaiting appraisal.
    #[sea_orm(string_value = "pending_appraisal")]
    PendingAppraisal,
    /// Appraisal approved, awaiting fund disbursement.
    #[sea_orm(string_value = "sanctioned")]
    Sanctioned,
    /// Approved but not yet sanctioned for funds.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected during appraisal.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Funds released; terminal.
    #[sea_orm(string_value = "disbursed")]
    Disbursed,
}

impl From<EntryType> for DomainEntryType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}

impl From<DomainEntryType> for EntryType {
    fn from(value: DomainEntryType) -> Self {
        match value {
            DomainEntryType::Debit => Self::Debit,
            DomainEntryType::Credit => Self::Credit,
        }
    }
}

impl From<EntryStatus> for DomainEntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Pending => Self::Pending,
            EntryStatus::Approved => Self::Approved,
            EntryStatus::Returned => Self::Returned,
            EntryStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<DomainEntryStatus> for EntryStatus {
    fn from(value: DomainEntryStatus) -> Self {
        match value {
            DomainEntryStatus::Pending => Self::Pending,
            DomainEntryStatus::Approved => Self::Approved,
            DomainEntryStatus::Returned => Self::Returned,
            DomainEntryStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<LoanStatus> for DomainLoanStatus {
    fn from(value: LoanStatus) -> Self {
        match value {
            LoanStatus::PendingAppraisal => Self::PendingAppraisal,
            LoanStatus::Sanctioned => Self::Sanctioned,
            LoanStatus::Approved => Self::Approved,
            LoanStatus::Rejected => Self::Rejected,
            LoanStatus::Disbursed => Self::Disbursed,
        }
    }
}

impl From<DomainLoanStatus> for LoanStatus {
    fn from(value: DomainLoanStatus) -> Self {
        match value {
            DomainLoanStatus::PendingAppraisal => Self::PendingAppraisal,
            DomainLoanStatus::Sanctioned => Self::Sanctioned,
            DomainLoanStatus::Approved => Self::Approved,
            DomainLoanStatus::Rejected => Self::Rejected,
            DomainLoanStatus::Disbursed => Self::Disbursed,
        }
    }
}
