//! The reference-group aggregate.
//!
//! All ledger entries sharing one reference number form a single atomic
//! financial event. The group is the unit of approval: it is only
//! constructible through `TransactionGroup::try_new`, which enforces the
//! double-entry invariants, so downstream code never re-derives
//! membership or balance ad hoc.

use std::collections::HashMap;

use rust_decimal::Decimal;

use harambee_shared::types::money;

use super::error::PostingError;
use super::types::{AccountRef, EntryStatus, EntryType, LedgerEntry};

/// Net signed effect of a group on one account.
///
/// Positive `net` increases the account's available balance (credits
/// outweigh debits), negative decreases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The affected account.
    pub account: AccountRef,
    /// The signed net amount (credit - debit).
    pub net: Decimal,
}

/// A validated set of ledger entries sharing one reference number.
#[derive(Debug, Clone)]
pub struct TransactionGroup {
    reference: String,
    entries: Vec<LedgerEntry>,
    status: EntryStatus,
    total: Decimal,
}

impl TransactionGroup {
    /// Builds a group from the entries loaded for a reference number,
    /// enforcing the group invariants.
    ///
    /// # Errors
    ///
    /// - `GroupEmpty` if no entries were found
    /// - `ReferenceMismatch` if a leg carries a different reference
    /// - `InvalidAmount` if any leg is non-positive or sub-cent
    /// - `MixedStatus` if the legs are not all in one status
    /// - `Unbalanced` if debit and credit minor-unit sums differ
    pub fn try_new(
        reference: impl Into<String>,
        entries: Vec<LedgerEntry>,
    ) -> Result<Self, PostingError> {
        let reference = reference.into();

        let Some(first) = entries.first() else {
            return Err(PostingError::GroupEmpty(reference));
        };

        if let Some(stray) = entries.iter().find(|e| e.reference_number != reference) {
            return Err(PostingError::ReferenceMismatch {
                entry_id: stray.id,
                found: stray.reference_number.clone(),
                expected: reference,
            });
        }

        let status = first.status;
        if entries.iter().any(|e| e.status != status) {
            return Err(PostingError::MixedStatus(reference));
        }

        // Compare sums in integer minor units, never in floating point.
        let mut debit_minor: i128 = 0;
        let mut credit_minor: i128 = 0;
        for entry in &entries {
            let Some(minor) = money::to_minor_units(entry.amount) else {
                return Err(PostingError::InvalidAmount(entry.id));
            };
            if minor <= 0 {
                return Err(PostingError::InvalidAmount(entry.id));
            }
            match entry.entry_type {
                EntryType::Debit => debit_minor += minor,
                EntryType::Credit => credit_minor += minor,
            }
        }

        if debit_minor != credit_minor {
            return Err(PostingError::Unbalanced {
                reference,
                debit: Self::sum_side(&entries, EntryType::Debit),
                credit: Self::sum_side(&entries, EntryType::Credit),
            });
        }

        let total = Self::sum_side(&entries, EntryType::Debit);

        Ok(Self {
            reference,
            entries,
            status,
            total,
        })
    }

    /// The reference number shared by all legs.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The common status of every leg.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        self.status
    }

    /// The legs of this group.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Total value of the event (debit side; equal to the credit side).
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Net signed balance effect per account, in leg order of first
    /// appearance.
    ///
    /// DEBIT decreases the account's available balance, CREDIT increases
    /// it. Legs against the same account are combined.
    #[must_use]
    pub fn balance_deltas(&self) -> Vec<BalanceDelta> {
        let mut order: Vec<AccountRef> = Vec::new();
        let mut nets: HashMap<AccountRef, Decimal> = HashMap::new();

        for entry in &self.entries {
            let signed = match entry.entry_type {
                EntryType::Debit => -entry.amount,
                EntryType::Credit => entry.amount,
            };
            nets.entry(entry.account)
                .and_modify(|n| *n += signed)
                .or_insert_with(|| {
                    order.push(entry.account);
                    signed
                });
        }

        order
            .into_iter()
            .map(|account| BalanceDelta {
                account,
                net: nets[&account],
            })
            .collect()
    }

    fn sum_side(entries: &[LedgerEntry], side: EntryType) -> Decimal {
        entries
            .iter()
            .filter(|e| e.entry_type == side)
            .map(|e| e.amount)
            .sum()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::posting::types::{AccountRef, EntryStatus, EntryType, LedgerEntry};

    /// Builds a leg for group tests.
    pub fn leg(
        reference: &str,
        account: AccountRef,
        entry_type: EntryType,
        amount: Decimal,
        status: EntryStatus,
    ) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::now_v7(),
            reference_number: reference.to_string(),
            account,
            entry_type,
            amount,
            status,
            verifier_remarks: None,
            created_by: Uuid::now_v7(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::leg;
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn gl() -> AccountRef {
        AccountRef::Gl(Uuid::now_v7())
    }

    fn member() -> AccountRef {
        AccountRef::Member(Uuid::now_v7())
    }

    #[test]
    fn test_balanced_group() {
        let entries = vec![
            leg("TXN-1", gl(), EntryType::Debit, dec!(500), EntryStatus::Pending),
            leg("TXN-1", member(), EntryType::Credit, dec!(500), EntryStatus::Pending),
        ];
        let group = TransactionGroup::try_new("TXN-1", entries).unwrap();
        assert_eq!(group.reference(), "TXN-1");
        assert_eq!(group.status(), EntryStatus::Pending);
        assert_eq!(group.total(), dec!(500));
        assert_eq!(group.entries().len(), 2);
    }

    #[test]
    fn test_empty_group() {
        let err = TransactionGroup::try_new("TXN-1", vec![]).unwrap_err();
        assert!(matches!(err, PostingError::GroupEmpty(r) if r == "TXN-1"));
    }

    #[test]
    fn test_rejects_leg_with_foreign_reference() {
        let entries = vec![
            leg("TXN-1", gl(), EntryType::Debit, dec!(100), EntryStatus::Pending),
            leg("TXN-2", member(), EntryType::Credit, dec!(100), EntryStatus::Pending),
        ];
        let err = TransactionGroup::try_new("TXN-1", entries).unwrap_err();
        assert!(
            matches!(err, PostingError::ReferenceMismatch { found, expected, .. }
                if found == "TXN-2" && expected == "TXN-1")
        );
    }

    #[test]
    fn test_unbalanced_group() {
        let entries = vec![
            leg("TXN-1", gl(), EntryType::Debit, dec!(500), EntryStatus::Pending),
            leg("TXN-1", member(), EntryType::Credit, dec!(400), EntryStatus::Pending),
        ];
        let err = TransactionGroup::try_new("TXN-1", entries).unwrap_err();
        match err {
            PostingError::Unbalanced {
                reference,
                debit,
                credit,
            } => {
                assert_eq!(reference, "TXN-1");
                assert_eq!(debit, dec!(500));
                assert_eq!(credit, dec!(400));
            }
            other => panic!("expected Unbalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_status_group() {
        let entries = vec![
            leg("TXN-1", gl(), EntryType::Debit, dec!(500), EntryStatus::Pending),
            leg("TXN-1", member(), EntryType::Credit, dec!(500), EntryStatus::Approved),
        ];
        let err = TransactionGroup::try_new("TXN-1", entries).unwrap_err();
        assert!(matches!(err, PostingError::MixedStatus(_)));
    }

    #[test]
    fn test_zero_amount_leg_rejected() {
        let entries = vec![
            leg("TXN-1", gl(), EntryType::Debit, dec!(0), EntryStatus::Pending),
            leg("TXN-1", member(), EntryType::Credit, dec!(0), EntryStatus::Pending),
        ];
        let err = TransactionGroup::try_new("TXN-1", entries).unwrap_err();
        assert!(matches!(err, PostingError::InvalidAmount(_)));
    }

    #[test]
    fn test_sub_cent_leg_rejected() {
        let entries = vec![
            leg("TXN-1", gl(), EntryType::Debit, dec!(0.005), EntryStatus::Pending),
            leg("TXN-1", member(), EntryType::Credit, dec!(0.005), EntryStatus::Pending),
        ];
        let err = TransactionGroup::try_new("TXN-1", entries).unwrap_err();
        assert!(matches!(err, PostingError::InvalidAmount(_)));
    }

    #[test]
    fn test_multi_leg_group_balances() {
        // One debit funding two credits
        let entries = vec![
            leg("TXN-2", gl(), EntryType::Debit, dec!(1000), EntryStatus::Pending),
            leg("TXN-2", member(), EntryType::Credit, dec!(750), EntryStatus::Pending),
            leg("TXN-2", member(), EntryType::Credit, dec!(250), EntryStatus::Pending),
        ];
        let group = TransactionGroup::try_new("TXN-2", entries).unwrap();
        assert_eq!(group.total(), dec!(1000));
    }

    #[test]
    fn test_balance_deltas_signed() {
        let funding = gl();
        let loan = member();
        let entries = vec![
            leg("TXN-3", funding, EntryType::Debit, dec!(5000), EntryStatus::Pending),
            leg("TXN-3", loan, EntryType::Credit, dec!(5000), EntryStatus::Pending),
        ];
        let group = TransactionGroup::try_new("TXN-3", entries).unwrap();
        let deltas = group.balance_deltas();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0], BalanceDelta { account: funding, net: dec!(-5000) });
        assert_eq!(deltas[1], BalanceDelta { account: loan, net: dec!(5000) });
    }

    #[test]
    fn test_balance_deltas_combine_same_account() {
        let acct = member();
        let other = gl();
        let entries = vec![
            leg("TXN-4", acct, EntryType::Credit, dec!(300), EntryStatus::Pending),
            leg("TXN-4", acct, EntryType::Debit, dec!(100), EntryStatus::Pending),
            leg("TXN-4", other, EntryType::Debit, dec!(200), EntryStatus::Pending),
        ];
        let group = TransactionGroup::try_new("TXN-4", entries).unwrap();
        let deltas = group.balance_deltas();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].account, acct);
        assert_eq!(deltas[0].net, dec!(200));
        assert_eq!(deltas[1].net, dec!(-200));
    }

    #[test]
    fn test_deltas_sum_to_zero() {
        let entries = vec![
            leg("TXN-5", gl(), EntryType::Debit, dec!(100.50), EntryStatus::Pending),
            leg("TXN-5", member(), EntryType::Credit, dec!(60.25), EntryStatus::Pending),
            leg("TXN-5", member(), EntryType::Credit, dec!(40.25), EntryStatus::Pending),
        ];
        let group = TransactionGroup::try_new("TXN-5", entries).unwrap();
        let sum: Decimal = group.balance_deltas().iter().map(|d| d.net).sum();
        assert_eq!(sum, Decimal::ZERO);
    }
}
