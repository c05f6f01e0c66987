//! Property tests for the posting service.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::group::{test_support::leg, TransactionGroup};
use super::service::{AccountState, PostingService};
use super::types::{AccountRef, EntryStatus, EntryType};

fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

proptest! {
    /// Approving a transfer conserves the combined balance of both sides.
    #[test]
    fn prop_approval_conserves_total(
        amount_cents in 1i64..=1_000_000_000,
        source_cents in 0i64..=2_000_000_000,
    ) {
        let source = AccountRef::Gl(Uuid::now_v7());
        let dest = AccountRef::Member(Uuid::now_v7());
        let amount = from_cents(amount_cents);
        let source_balance = from_cents(source_cents);

        let entries = vec![
            leg("TXN-S", source, EntryType::Debit, amount, EntryStatus::Pending),
            leg("TXN-S", dest, EntryType::Credit, amount, EntryStatus::Pending),
        ];
        let group = TransactionGroup::try_new("TXN-S", entries).unwrap();

        let result = PostingService::apply_approval(&group, |account| {
            Ok(AccountState {
                account,
                available_balance: if account == source { source_balance } else { Decimal::ZERO },
                balance_floor: Decimal::ZERO,
                allow_overdraft: false,
                is_active: true,
            })
        });

        if source_balance >= amount {
            let posted = result.unwrap();
            let before: Decimal = posted.iter().map(|p| p.previous_balance).sum();
            let after: Decimal = posted.iter().map(|p| p.new_balance).sum();
            prop_assert_eq!(before, after);
        } else {
            // insufficient funds without overdraft must refuse
            prop_assert!(result.is_err());
        }
    }

    /// Every transition out of Pending succeeds; every transition out of
    /// a terminal state fails.
    #[test]
    fn prop_only_pending_transitions(
        start in prop_oneof![
            Just(EntryStatus::Pending),
            Just(EntryStatus::Approved),
            Just(EntryStatus::Returned),
            Just(EntryStatus::Rejected),
        ],
        target in prop_oneof![
            Just(EntryStatus::Approved),
            Just(EntryStatus::Returned),
            Just(EntryStatus::Rejected),
        ],
    ) {
        let entries = vec![
            leg(
                "TXN-S",
                AccountRef::Gl(Uuid::now_v7()),
                EntryType::Debit,
                from_cents(100),
                start,
            ),
            leg(
                "TXN-S",
                AccountRef::Member(Uuid::now_v7()),
                EntryType::Credit,
                from_cents(100),
                start,
            ),
        ];
        let group = TransactionGroup::try_new("TXN-S", entries).unwrap();
        let result = PostingService::transition(&group, target, None, Uuid::now_v7());
        prop_assert_eq!(result.is_ok(), start == EntryStatus::Pending);
    }
}
