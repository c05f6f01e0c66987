//! Partial-failure accounting for bulk operations.
//!
//! Bulk approval and bulk disbursement process items independently: one
//! item's failure never aborts the rest. Each item lands in exactly one
//! of three buckets. `succeeded` and `failed` are definitive outcomes;
//! `uncertain` marks items whose infrastructure error leaves the real
//! outcome unknown, so operators can reconcile them instead of blindly
//! retrying.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Serialize;

use crate::disbursement::DisbursementError;
use crate::posting::PostingError;

/// Errors that can distinguish a clean refusal from an unknown outcome.
pub trait Uncertainty {
    /// True when the operation may or may not have taken effect.
    fn is_uncertain(&self) -> bool;
}

impl Uncertainty for PostingError {
    fn is_uncertain(&self) -> bool {
        self.is_uncertain()
    }
}

impl Uncertainty for DisbursementError {
    fn is_uncertain(&self) -> bool {
        self.is_uncertain()
    }
}

/// One failed batch item with its reason string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure<Id> {
    /// The item that failed.
    pub id: Id,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Aggregated result of a bulk operation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome<Id> {
    /// Items whose operation completed.
    pub succeeded: Vec<Id>,
    /// Items cleanly refused, with reasons.
    pub failed: Vec<BatchFailure<Id>>,
    /// Items whose outcome is unknown; need manual reconciliation.
    pub uncertain: Vec<BatchFailure<Id>>,
}

impl<Id> Default for BatchOutcome<Id> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            uncertain: Vec::new(),
        }
    }
}

impl<Id> BatchOutcome<Id> {
    /// An empty outcome to accumulate into.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed item.
    pub fn record_success(&mut self, id: Id) {
        self.succeeded.push(id);
    }

    /// Records a failed item, routing it to `failed` or `uncertain`
    /// based on the error's uncertainty.
    pub fn record_error<E>(&mut self, id: Id, error: &E)
    where
        E: Uncertainty + std::fmt::Display,
    {
        let failure = BatchFailure {
            id,
            reason: error.to_string(),
        };
        if error.is_uncertain() {
            self.uncertain.push(failure);
        } else {
            self.failed.push(failure);
        }
    }

    /// Total items processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.uncertain.len()
    }

    /// One-line summary for callers, e.g. `"2 of 3 succeeded"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} of {} succeeded", self.succeeded.len(), self.total())
    }

    /// True when every item completed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.uncertain.is_empty()
    }
}

/// Deduplicates a caller-supplied id list, keeping first-seen order.
///
/// Bulk approval needs this after mapping entry ids to reference
/// numbers: selecting any entry in a group selects the whole group, so
/// the same reference may appear many times.
#[must_use]
pub fn dedup_preserving_order<T>(items: Vec<T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_all_buckets() {
        let mut outcome: BatchOutcome<String> = BatchOutcome::new();
        outcome.record_success("TXN-1".into());
        outcome.record_success("TXN-2".into());
        outcome.record_error(
            "TXN-3".into(),
            &PostingError::GroupEmpty("TXN-3".into()),
        );
        outcome.record_error(
            "TXN-4".into(),
            &PostingError::Database("connection reset".into()),
        );

        assert_eq!(outcome.total(), 4);
        assert_eq!(outcome.summary(), "2 of 4 succeeded");
        assert!(!outcome.all_succeeded());
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.uncertain.len(), 1);
        assert_eq!(outcome.uncertain[0].id, "TXN-4");
    }

    #[test]
    fn test_clean_refusal_is_not_uncertain() {
        let mut outcome: BatchOutcome<u32> = BatchOutcome::new();
        outcome.record_error(
            7,
            &PostingError::Unbalanced {
                reference: "TXN-7".into(),
                debit: rust_decimal::Decimal::new(100, 0),
                credit: rust_decimal::Decimal::new(99, 0),
            },
        );
        assert!(outcome.uncertain.is_empty());
        assert_eq!(outcome.failed[0].id, 7);
        assert!(outcome.failed[0].reason.contains("TXN-7"));
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let ids = vec!["b", "a", "b", "c", "a"];
        assert_eq!(dedup_preserving_order(ids), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_batch() {
        let outcome: BatchOutcome<u32> = BatchOutcome::new();
        assert_eq!(outcome.total(), 0);
        assert_eq!(outcome.summary(), "0 of 0 succeeded");
        assert!(outcome.all_succeeded());
    }
}
