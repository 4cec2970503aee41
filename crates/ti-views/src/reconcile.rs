//! Keyed enter / update / exit diffing of bucket lists

use ahash::AHashSet;
use ti_data::{AggregationKey, Bucket};

/// Difference between two bucket lists, keyed by bucket key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Buckets only in the new list, in new-list order
    pub entered: Vec<Bucket>,
    /// Buckets in both lists with their new values, in new-list order
    pub updated: Vec<Bucket>,
    /// Keys only in the old list, in old-list order
    pub exited: Vec<AggregationKey>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.updated.is_empty() && self.exited.is_empty()
    }
}

/// Diff `previous` against `next`
pub fn reconcile(previous: &[Bucket], next: &[Bucket]) -> Reconciliation {
    let before: AHashSet<&AggregationKey> = previous.iter().map(|b| &b.key).collect();
    let after: AHashSet<&AggregationKey> = next.iter().map(|b| &b.key).collect();

    let (updated, entered): (Vec<Bucket>, Vec<Bucket>) = next.iter().cloned().partition(|b| before.contains(&b.key));
    let exited = previous
        .iter()
        .filter(|b| !after.contains(&b.key))
        .map(|b| b.key.clone())
        .collect();

    Reconciliation { entered, updated, exited }
}
