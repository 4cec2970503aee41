//! Per-chart key selection
//!
//! A [`FilterSet`] holds the keys a chart has selected and pushes them onto
//! the chart's own dimension as an `in` filter.

use indexmap::IndexSet;
use ti_data::{AggregationKey, Dimension};

/// Keys selected in one chart, in selection order. Empty means no filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    keys: IndexSet<AggregationKey>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the key if absent, remove it if present. Returns whether the key
    /// is selected afterwards.
    pub fn toggle(&mut self, key: &AggregationKey) -> bool {
        if self.keys.shift_remove(key) {
            false
        } else {
            self.keys.insert(key.clone());
            true
        }
    }

    pub fn insert(&mut self, key: AggregationKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: &AggregationKey) -> bool {
        self.keys.shift_remove(key)
    }

    pub fn contains(&self, key: &AggregationKey) -> bool {
        self.keys.contains(key)
    }

    /// A mark is shown when nothing is selected or its key is selected
    pub fn is_visible(&self, key: &AggregationKey) -> bool {
        self.keys.is_empty() || self.keys.contains(key)
    }

    /// Like [`FilterSet::is_visible`] for a mark standing for several keys
    pub fn is_any_visible<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a AggregationKey>,
    {
        self.keys.is_empty() || keys.into_iter().any(|k| self.keys.contains(k))
    }

    /// Push the selection into the dimension
    pub fn apply_to(&self, dimension: &Dimension) {
        if self.keys.is_empty() {
            dimension.filter_all();
        } else {
            dimension.filter_in(self.keys.iter());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregationKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_data::{AggregationIndex, DimensionKey, Record, Value};

    #[test]
    fn test_visibility() {
        let mut filters = FilterSet::new();
        let sea = AggregationKey::from("SEA");
        let pdx = AggregationKey::from("PDX");

        assert!(filters.is_visible(&sea));
        assert!(filters.toggle(&sea));
        assert!(filters.is_visible(&sea));
        assert!(!filters.is_visible(&pdx));
        assert!(filters.is_any_visible([&pdx, &sea]));
        assert!(!filters.is_any_visible([&pdx]));
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let index = AggregationIndex::new(vec![
            Record::from_pairs([("origin", Value::from("SEA"))]),
            Record::from_pairs([("origin", Value::from("PDX"))]),
        ]);
        let origin = index.dimension(DimensionKey::Single("origin".into()));
        let sea = AggregationKey::from("SEA");

        let mut filters = FilterSet::new();
        filters.toggle(&sea);
        filters.apply_to(&origin);
        assert_eq!(index.filtered_len(), 1);

        filters.toggle(&sea);
        filters.apply_to(&origin);
        assert!(filters.is_empty());
        assert!(!origin.is_filtered());
        assert_eq!(index.filtered_len(), 2);
    }
}
