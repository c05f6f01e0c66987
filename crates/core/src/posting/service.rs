//! Stateless posting service.
//!
//! Validates group status transitions and computes the balance effects of
//! an approval. This service contains pure business logic with no
//! database dependencies; the repository layer re-runs these checks under
//! a per-reference lock before persisting anything.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::PostingError;
use super::group::TransactionGroup;
use super::types::{AccountRef, EntryStatus, VerifierStamp};

/// Snapshot of an account needed to apply a posting.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The account reference.
    pub account: AccountRef,
    /// Current available balance.
    pub available_balance: Decimal,
    /// Balance the account may not drop below on a debit.
    pub balance_floor: Decimal,
    /// Whether debits may take the account below the floor.
    pub allow_overdraft: bool,
    /// Whether the account accepts postings at all.
    pub is_active: bool,
}

/// Balance movement computed for one account of an approved group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedBalance {
    /// The affected account.
    pub account: AccountRef,
    /// Balance before the group was applied.
    pub previous_balance: Decimal,
    /// Balance after the group was applied.
    pub new_balance: Decimal,
}

/// A validated status transition with its verifier stamp.
#[derive(Debug, Clone)]
pub enum TransitionAction {
    /// Approve the group and post its balances.
    Approve {
        /// Verifier audit data.
        stamp: VerifierStamp,
    },
    /// Return the group to its maker; no balance effect.
    Return {
        /// Verifier audit data.
        stamp: VerifierStamp,
    },
    /// Reject the group; no balance effect.
    Reject {
        /// Verifier audit data.
        stamp: VerifierStamp,
    },
}

impl TransitionAction {
    /// The group status this action results in.
    #[must_use]
    pub const fn new_status(&self) -> EntryStatus {
        match self {
            Self::Approve { .. } => EntryStatus::Approved,
            Self::Return { .. } => EntryStatus::Returned,
            Self::Reject { .. } => EntryStatus::Rejected,
        }
    }

    /// The verifier stamp carried by this action.
    #[must_use]
    pub const fn stamp(&self) -> &VerifierStamp {
        match self {
            Self::Approve { stamp } | Self::Return { stamp } | Self::Reject { stamp } => stamp,
        }
    }

    /// Whether this action mutates account balances.
    #[must_use]
    pub const fn posts_balances(&self) -> bool {
        matches!(self, Self::Approve { .. })
    }
}

/// Stateless engine for posting-group transitions and balance application.
pub struct PostingService;

impl PostingService {
    /// Validates a status transition for a group.
    ///
    /// The group must currently be Pending; any terminal state (or a
    /// target of Pending) fails with `InvalidTransition`. Callers racing
    /// on the same reference must re-run this under the per-reference
    /// lock: the loser re-reads a terminal status and fails here.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the transition table forbids it.
    pub fn transition(
        group: &TransactionGroup,
        target: EntryStatus,
        remarks: Option<String>,
        actor: Uuid,
    ) -> Result<TransitionAction, PostingError> {
        let from = group.status();
        if !from.can_transition_to(target) {
            return Err(PostingError::InvalidTransition { from, to: target });
        }

        let stamp = VerifierStamp {
            verified_by: actor,
            verified_at: Utc::now(),
            remarks,
        };

        Ok(match target {
            EntryStatus::Approved => TransitionAction::Approve { stamp },
            EntryStatus::Returned => TransitionAction::Return { stamp },
            EntryStatus::Rejected => TransitionAction::Reject { stamp },
            // can_transition_to never admits Pending as a target
            EntryStatus::Pending => unreachable!("transition table forbids Pending targets"),
        })
    }

    /// Computes the post-approval balance for every account the group
    /// touches, enforcing the balance policy.
    ///
    /// All-or-nothing: the first account that is missing, inactive, or
    /// would breach its floor fails the whole group and nothing is
    /// returned. The same path serves verifier approval (§ approval
    /// workflow) and immediate disbursement postings.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` / `AccountInactive` for bad legs
    /// - `BalanceFloorBreached` when a net debit would cross the floor
    ///   and the account does not permit overdraft
    pub fn apply_approval<L>(
        group: &TransactionGroup,
        lookup: L,
    ) -> Result<Vec<PostedBalance>, PostingError>
    where
        L: Fn(AccountRef) -> Result<AccountState, PostingError>,
    {
        let deltas = group.balance_deltas();
        let mut posted = Vec::with_capacity(deltas.len());

        for delta in deltas {
            let state = lookup(delta.account)?;
            if !state.is_active {
                return Err(PostingError::AccountInactive(delta.account));
            }

            let new_balance = state.available_balance + delta.net;
            if delta.net < Decimal::ZERO
                && new_balance < state.balance_floor
                && !state.allow_overdraft
            {
                return Err(PostingError::BalanceFloorBreached {
                    account: delta.account,
                    amount: -delta.net,
                    available: state.available_balance,
                    floor: state.balance_floor,
                });
            }

            posted.push(PostedBalance {
                account: delta.account,
                previous_balance: state.available_balance,
                new_balance,
            });
        }

        Ok(posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::group::test_support::leg;
    use crate::posting::types::EntryType;
    use rust_decimal_macros::dec;

    fn pending_group(amount: Decimal, debit: AccountRef, credit: AccountRef) -> TransactionGroup {
        let entries = vec![
            leg("TXN-9", debit, EntryType::Debit, amount, EntryStatus::Pending),
            leg("TXN-9", credit, EntryType::Credit, amount, EntryStatus::Pending),
        ];
        TransactionGroup::try_new("TXN-9", entries).unwrap()
    }

    fn state(account: AccountRef, balance: Decimal) -> AccountState {
        AccountState {
            account,
            available_balance: balance,
            balance_floor: Decimal::ZERO,
            allow_overdraft: false,
            is_active: true,
        }
    }

    #[test]
    fn test_transition_pending_to_approved() {
        let group = pending_group(
            dec!(100),
            AccountRef::Gl(Uuid::now_v7()),
            AccountRef::Member(Uuid::now_v7()),
        );
        let actor = Uuid::now_v7();
        let action =
            PostingService::transition(&group, EntryStatus::Approved, Some("ok".into()), actor)
                .unwrap();
        assert_eq!(action.new_status(), EntryStatus::Approved);
        assert!(action.posts_balances());
        assert_eq!(action.stamp().verified_by, actor);
        assert_eq!(action.stamp().remarks.as_deref(), Some("ok"));
    }

    #[test]
    fn test_transition_pending_to_returned_and_rejected() {
        let group = pending_group(
            dec!(100),
            AccountRef::Gl(Uuid::now_v7()),
            AccountRef::Member(Uuid::now_v7()),
        );
        let actor = Uuid::now_v7();
        for target in [EntryStatus::Returned, EntryStatus::Rejected] {
            let action = PostingService::transition(&group, target, None, actor).unwrap();
            assert_eq!(action.new_status(), target);
            assert!(!action.posts_balances());
        }
    }

    #[test]
    fn test_transition_from_terminal_fails() {
        let entries = vec![
            leg(
                "TXN-9",
                AccountRef::Gl(Uuid::now_v7()),
                EntryType::Debit,
                dec!(100),
                EntryStatus::Approved,
            ),
            leg(
                "TXN-9",
                AccountRef::Member(Uuid::now_v7()),
                EntryType::Credit,
                dec!(100),
                EntryStatus::Approved,
            ),
        ];
        let group = TransactionGroup::try_new("TXN-9", entries).unwrap();
        let err =
            PostingService::transition(&group, EntryStatus::Approved, None, Uuid::now_v7())
                .unwrap_err();
        assert!(matches!(
            err,
            PostingError::InvalidTransition {
                from: EntryStatus::Approved,
                to: EntryStatus::Approved,
            }
        ));
    }

    #[test]
    fn test_transition_to_pending_fails() {
        let group = pending_group(
            dec!(100),
            AccountRef::Gl(Uuid::now_v7()),
            AccountRef::Member(Uuid::now_v7()),
        );
        let err = PostingService::transition(&group, EntryStatus::Pending, None, Uuid::now_v7())
            .unwrap_err();
        assert!(matches!(err, PostingError::InvalidTransition { .. }));
    }

    #[test]
    fn test_apply_approval_moves_balances() {
        let funding = AccountRef::Gl(Uuid::now_v7());
        let loan = AccountRef::Member(Uuid::now_v7());
        let group = pending_group(dec!(5000), funding, loan);

        let posted = PostingService::apply_approval(&group, |account| {
            if account == funding {
                Ok(state(account, dec!(100_000)))
            } else {
                Ok(state(account, dec!(0)))
            }
        })
        .unwrap();

        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].account, funding);
        assert_eq!(posted[0].previous_balance, dec!(100_000));
        assert_eq!(posted[0].new_balance, dec!(95_000));
        assert_eq!(posted[1].account, loan);
        assert_eq!(posted[1].new_balance, dec!(5000));
    }

    #[test]
    fn test_apply_approval_missing_account_fails_whole_group() {
        let funding = AccountRef::Gl(Uuid::now_v7());
        let loan = AccountRef::Member(Uuid::now_v7());
        let group = pending_group(dec!(5000), funding, loan);

        let err = PostingService::apply_approval(&group, |account| {
            if account == funding {
                Ok(state(account, dec!(100_000)))
            } else {
                Err(PostingError::AccountNotFound(account))
            }
        })
        .unwrap_err();
        assert!(matches!(err, PostingError::AccountNotFound(a) if a == loan));
    }

    #[test]
    fn test_apply_approval_inactive_account() {
        let funding = AccountRef::Gl(Uuid::now_v7());
        let loan = AccountRef::Member(Uuid::now_v7());
        let group = pending_group(dec!(100), funding, loan);

        let err = PostingService::apply_approval(&group, |account| {
            let mut s = state(account, dec!(1000));
            if account == loan {
                s.is_active = false;
            }
            Ok(s)
        })
        .unwrap_err();
        assert!(matches!(err, PostingError::AccountInactive(a) if a == loan));
    }

    #[test]
    fn test_apply_approval_floor_breach() {
        let funding = AccountRef::Gl(Uuid::now_v7());
        let loan = AccountRef::Member(Uuid::now_v7());
        let group = pending_group(dec!(5000), funding, loan);

        // Funding account only has 3000 available and no overdraft
        let err = PostingService::apply_approval(&group, |account| {
            if account == funding {
                Ok(state(account, dec!(3000)))
            } else {
                Ok(state(account, dec!(0)))
            }
        })
        .unwrap_err();
        match err {
            PostingError::BalanceFloorBreached {
                account,
                amount,
                available,
                floor,
            } => {
                assert_eq!(account, funding);
                assert_eq!(amount, dec!(5000));
                assert_eq!(available, dec!(3000));
                assert_eq!(floor, dec!(0));
            }
            other => panic!("expected BalanceFloorBreached, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_approval_overdraft_permitted() {
        let funding = AccountRef::Gl(Uuid::now_v7());
        let loan = AccountRef::Member(Uuid::now_v7());
        let group = pending_group(dec!(5000), funding, loan);

        let posted = PostingService::apply_approval(&group, |account| {
            let mut s = state(account, dec!(0));
            if account == funding {
                s.allow_overdraft = true;
            }
            Ok(s)
        })
        .unwrap();
        assert_eq!(posted[0].new_balance, dec!(-5000));
    }
}
