//! Dimensional aggregation index shared by every chart
//!
//! The index owns the raw records. Each chart registers one [`Dimension`]
//! (a single field or a pair of fields) and drives it through filters. Grouping
//! a dimension counts records per key while honouring the filters of every
//! other dimension, so charts see each other's selections but not their own.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use ti_core::GlobalQuery;

use crate::key::{AggregationKey, Bucket};
use crate::record::Record;

/// What a dimension groups records by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimensionKey {
    Single(String),
    Composite(String, String),
}

impl DimensionKey {
    /// Dimension over one field or a pair of fields
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        match fields {
            [field] => Some(DimensionKey::Single(field.clone())),
            [a, b] => Some(DimensionKey::Composite(a.clone(), b.clone())),
            _ => None,
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        match self {
            DimensionKey::Single(field) => vec![field.as_str()],
            DimensionKey::Composite(a, b) => vec![a.as_str(), b.as_str()],
        }
    }

    /// Key of a record in this dimension
    pub fn key_of(&self, record: &Record) -> AggregationKey {
        match self {
            DimensionKey::Single(field) => AggregationKey::from_value(record.get(field)),
            DimensionKey::Composite(a, b) => AggregationKey::composite(&[a.as_str(), b.as_str()], record),
        }
    }

    /// Query index name, comma separated for composite dimensions
    pub fn index_name(&self) -> String {
        self.fields().join(",")
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.index_name())
    }
}

struct DimensionState {
    /// Distinct keys of the full population, ascending
    domain: Vec<AggregationKey>,

    /// Position in `domain` of each record's key
    record_keys: Vec<usize>,

    /// Accepted domain positions; `None` means unfiltered
    filter: Option<Vec<bool>>,
}

impl DimensionState {
    fn new(key: &DimensionKey, records: &[Arc<Record>]) -> Self {
        let keys: Vec<AggregationKey> = records.iter().map(|r| key.key_of(r)).collect();

        let mut domain = keys.clone();
        domain.sort();
        domain.dedup();

        let positions: AHashMap<&AggregationKey, usize> =
            domain.iter().enumerate().map(|(i, k)| (k, i)).collect();
        let record_keys = keys.iter().map(|k| positions[k]).collect();

        Self {
            domain,
            record_keys,
            filter: None,
        }
    }

    fn accepts(&self, record: usize) -> bool {
        match &self.filter {
            Some(accepted) => accepted[self.record_keys[record]],
            None => true,
        }
    }

    fn position(&self, key: &AggregationKey) -> Option<usize> {
        self.domain.binary_search(key).ok()
    }
}

struct IndexState {
    records: Vec<Arc<Record>>,
    dimensions: Vec<DimensionState>,
}

impl IndexState {
    /// Whether a record passes every filter except the one of `skip`
    fn passes(&self, record: usize, skip: Option<usize>) -> bool {
        self.dimensions
            .iter()
            .enumerate()
            .filter(|(id, _)| Some(*id) != skip)
            .all(|(_, dim)| dim.accepts(record))
    }
}

/// Shared dimensional index over the raw record set
#[derive(Clone)]
pub struct AggregationIndex {
    state: Arc<RwLock<IndexState>>,
}

impl AggregationIndex {
    /// Wrap a record set
    pub fn new(records: Vec<Record>) -> Self {
        tracing::info!("Building aggregation index over {} records", records.len());
        Self {
            state: Arc::new(RwLock::new(IndexState {
                records: records.into_iter().map(Arc::new).collect(),
                dimensions: Vec::new(),
            })),
        }
    }

    /// Register a dimension and return its handle
    pub fn dimension(&self, key: DimensionKey) -> Dimension {
        let mut state = self.state.write();
        let dim = DimensionState::new(&key, &state.records);
        tracing::debug!("Registered dimension '{}' with {} keys", key, dim.domain.len());

        state.dimensions.push(dim);
        Dimension {
            id: state.dimensions.len() - 1,
            key,
            state: self.state.clone(),
        }
    }

    /// Number of records in the full population
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records passing every filter
    pub fn filtered_len(&self) -> usize {
        let state = self.state.read();
        (0..state.records.len()).filter(|&i| state.passes(i, None)).count()
    }

    /// Count records (all filters applied) whose key for the query's fields
    /// satisfies the query
    pub fn count_matching(&self, query: &GlobalQuery) -> usize {
        let fields: Vec<String> = query.fields().into_iter().map(str::to_string).collect();
        let Some(key) = DimensionKey::from_fields(&fields) else {
            tracing::warn!("Query index '{}' does not name one or two fields", query.index);
            return 0;
        };

        let state = self.state.read();
        state
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| state.passes(*i, None))
            .filter(|(_, r)| query.matches(&key.key_of(r).to_json()))
            .count()
    }
}

/// Handle to one registered dimension
#[derive(Clone)]
pub struct Dimension {
    id: usize,
    key: DimensionKey,
    state: Arc<RwLock<IndexState>>,
}

impl Dimension {
    pub fn key(&self) -> &DimensionKey {
        &self.key
    }

    /// Clear this dimension's filter
    pub fn filter_all(&self) {
        self.state.write().dimensions[self.id].filter = None;
    }

    /// Keep only records whose key is one of `keys`
    pub fn filter_in<'a, I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'a AggregationKey>,
    {
        let mut state = self.state.write();
        let dim = &mut state.dimensions[self.id];
        let mut accepted = vec![false; dim.domain.len()];
        for key in keys {
            if let Some(pos) = dim.position(key) {
                accepted[pos] = true;
            }
        }
        dim.filter = Some(accepted);
    }

    /// Keep only records with exactly this key
    pub fn filter_exact(&self, key: &AggregationKey) {
        self.filter_in(std::iter::once(key));
    }

    pub fn is_filtered(&self) -> bool {
        self.state.read().dimensions[self.id].filter.is_some()
    }

    /// Count per key over the full key domain, ascending.
    ///
    /// Zero counts are included. Filters of other dimensions apply, this
    /// dimension's own filter does not.
    pub fn group(&self) -> Vec<Bucket> {
        let state = self.state.read();
        let dim = &state.dimensions[self.id];

        let mut counts = vec![0u64; dim.domain.len()];
        for (record, &pos) in dim.record_keys.iter().enumerate() {
            if state.passes(record, Some(self.id)) {
                counts[pos] += 1;
            }
        }

        dim.domain
            .iter()
            .zip(counts)
            .map(|(key, value)| Bucket { key: key.clone(), value })
            .collect()
    }

    /// Records passing every filter, grouped by this dimension's key
    pub fn filtered_by_key(&self) -> Vec<(AggregationKey, Arc<Record>)> {
        let state = self.state.read();
        let dim = &state.dimensions[self.id];
        (0..state.records.len())
            .filter(|&i| state.passes(i, None))
            .map(|i| (dim.domain[dim.record_keys[i]].clone(), state.records[i].clone()))
            .collect()
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension").field("id", &self.id).field("key", &self.key).finish()
    }
}
