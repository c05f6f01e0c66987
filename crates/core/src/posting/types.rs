//! Posting domain types.
//!
//! This module defines the core types for reference-grouped double-entry
//! posting: ledger entry legs, the entry status state machine, and the
//! account reference variant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entry type: either Debit or Credit.
///
/// In this core, a DEBIT decreases the account's available balance and a
/// CREDIT increases it. Normal-balance classification of GL accounts is a
/// reporting concern handled outside the posting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit leg (decreases available balance).
    Debit,
    /// Credit leg (increases available balance).
    Credit,
}

impl EntryType {
    /// Returns the string representation of the entry type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses an entry type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// Status of a ledger entry group in the approval workflow.
///
/// All entries sharing a reference number transition together. The valid
/// transitions are:
/// - Pending → Approved (posts balances)
/// - Pending → Returned (sent back for correction, no balance effect)
/// - Pending → Rejected (no balance effect)
///
/// Approved, Returned, and Rejected are terminal for the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Awaiting verification.
    Pending,
    /// Verified and posted to account balances (immutable).
    Approved,
    /// Sent back to the maker for correction (immutable).
    Returned,
    /// Rejected by the verifier (immutable).
    Rejected,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Returned => "returned",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "returned" => Some(Self::Returned),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if this status is terminal for the group.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Central transition table for the group state machine.
    ///
    /// Pending may move to any terminal status; terminal statuses never
    /// move again.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Approved | Self::Returned | Self::Rejected
            )
        )
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to the account a leg posts against.
///
/// A leg targets either a general-ledger account or a member sub-account,
/// never both. Modelling this as a closed variant makes the mutual
/// exclusivity unrepresentable to violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum AccountRef {
    /// General-ledger account.
    Gl(Uuid),
    /// Member sub-account.
    Member(Uuid),
}

impl AccountRef {
    /// Returns the inner account UUID.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Gl(id) | Self::Member(id) => *id,
        }
    }
}

impl std::fmt::Display for AccountRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gl(id) => write!(f, "gl:{id}"),
            Self::Member(id) => write!(f, "member:{id}"),
        }
    }
}

/// A single debit or credit leg within a reference group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry ID.
    pub id: Uuid,
    /// Reference number grouping this leg with its siblings.
    pub reference_number: String,
    /// The account this leg posts against.
    pub account: AccountRef,
    /// Whether this is a debit or credit leg.
    pub entry_type: EntryType,
    /// The amount (strictly positive, at most two decimal places).
    pub amount: Decimal,
    /// Group status this leg is in.
    pub status: EntryStatus,
    /// Remarks recorded by the verifier at transition time.
    pub verifier_remarks: Option<String>,
    /// The user who created the entry.
    pub created_by: Uuid,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

/// Verifier audit data stamped onto a group at transition time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierStamp {
    /// The user who performed the transition.
    pub verified_by: Uuid,
    /// When the transition happened.
    pub verified_at: DateTime<Utc>,
    /// Optional free-text remarks.
    pub remarks: Option<String>,
}
