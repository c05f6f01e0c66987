//! Property tests for group invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::group::{test_support::leg, TransactionGroup};
use super::types::{AccountRef, EntryStatus, EntryType};

fn amount_cents() -> impl Strategy<Value = i64> {
    // positive amounts up to 10 million units, in cents
    1i64..=1_000_000_000
}

fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

proptest! {
    /// A group built from matching debit/credit pairs always validates.
    #[test]
    fn prop_paired_legs_always_balance(amounts in prop::collection::vec(amount_cents(), 1..8)) {
        let mut entries = Vec::new();
        for cents in &amounts {
            let amount = from_cents(*cents);
            entries.push(leg(
                "TXN-P",
                AccountRef::Gl(Uuid::now_v7()),
                EntryType::Debit,
                amount,
                EntryStatus::Pending,
            ));
            entries.push(leg(
                "TXN-P",
                AccountRef::Member(Uuid::now_v7()),
                EntryType::Credit,
                amount,
                EntryStatus::Pending,
            ));
        }
        let group = TransactionGroup::try_new("TXN-P", entries).unwrap();
        prop_assert_eq!(group.entries().len(), amounts.len() * 2);
    }

    /// Perturbing one leg by a cent always breaks the balance invariant.
    #[test]
    fn prop_one_cent_skew_is_rejected(cents in amount_cents()) {
        let entries = vec![
            leg(
                "TXN-P",
                AccountRef::Gl(Uuid::now_v7()),
                EntryType::Debit,
                from_cents(cents),
                EntryStatus::Pending,
            ),
            leg(
                "TXN-P",
                AccountRef::Member(Uuid::now_v7()),
                EntryType::Credit,
                from_cents(cents + 1),
                EntryStatus::Pending,
            ),
        ];
        prop_assert!(TransactionGroup::try_new("TXN-P", entries).is_err());
    }

    /// The signed balance deltas of a valid group always sum to zero.
    #[test]
    fn prop_deltas_sum_to_zero(amounts in prop::collection::vec(amount_cents(), 1..8)) {
        let shared_gl = AccountRef::Gl(Uuid::now_v7());
        let mut entries = Vec::new();
        for cents in &amounts {
            let amount = from_cents(*cents);
            entries.push(leg("TXN-P", shared_gl, EntryType::Debit, amount, EntryStatus::Pending));
            entries.push(leg(
                "TXN-P",
                AccountRef::Member(Uuid::now_v7()),
                EntryType::Credit,
                amount,
                EntryStatus::Pending,
            ));
        }
        let group = TransactionGroup::try_new("TXN-P", entries).unwrap();
        let total: Decimal = group.balance_deltas().iter().map(|d| d.net).sum();
        prop_assert_eq!(total, Decimal::ZERO);
    }
}
