//! Descriptive annotations per bucket, shown on hover
//!
//! For every chart dimension the binner collects the distinct values of a
//! free-text field (`reason`, `purpose`, `description` ...) among the records
//! that pass all filters, keyed by the dimension key.

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::Serialize;

use crate::index::Dimension;
use crate::key::AggregationKey;
use crate::DataError;

/// One distinct annotation value and how many records carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationGroup {
    pub text: String,
    pub count: u64,
}

/// Annotation groups by bucket key, in first-appearance order
#[derive(Debug, Clone, Default)]
pub struct BinnedAnnotations {
    groups: AHashMap<AggregationKey, Vec<AnnotationGroup>>,
}

impl BinnedAnnotations {
    /// All annotation groups of a key
    pub fn for_key(&self, key: &AggregationKey) -> &[AnnotationGroup] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Text shown when hovering a key
    pub fn first(&self, key: &AggregationKey) -> Option<&str> {
        self.for_key(key).first().map(|g| g.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Groups filtered records by dimension key and collects annotation values
#[derive(Debug, Clone, Default)]
pub struct AnnotationBinner {
    field: Option<String>,
}

impl AnnotationBinner {
    pub fn new(field: Option<String>) -> Self {
        Self {
            field: field.filter(|f| !f.trim().is_empty()),
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Bin the records currently passing every filter
    pub fn bin(&self, dimension: &Dimension) -> Result<BinnedAnnotations, DataError> {
        let field = self.field.as_deref().ok_or(DataError::NoAnnotationField)?;

        let mut by_key: AHashMap<AggregationKey, IndexMap<String, u64>> = AHashMap::new();
        for (key, record) in dimension.filtered_by_key() {
            let value = record.get(field);
            if value.is_null() {
                continue;
            }
            let text = value.to_string();
            if text.trim().is_empty() {
                continue;
            }
            *by_key.entry(key).or_default().entry(text).or_insert(0) += 1;
        }

        let groups = by_key
            .into_iter()
            .map(|(key, texts)| {
                let groups = texts
                    .into_iter()
                    .map(|(text, count)| AnnotationGroup { text, count })
                    .collect();
                (key, groups)
            })
            .collect();

        let binned = BinnedAnnotations { groups };
        tracing::debug!("Binned '{}' annotations for {} keys of '{}'", field, binned.len(), dimension.key());
        Ok(binned)
    }
}
