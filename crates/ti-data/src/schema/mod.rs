//! Field schema and type inference
//!
//! [`TypeInference`] samples the loaded records once and classifies each
//! configured field as numeric or categorical; the resulting [`FieldSchema`]
//! picks the chart kind of every panel.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::NullConfig;
use crate::record::{Record, Value};

/// Classification of a configured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// A configured field: name, inferred kind and label margin hint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    /// `None` until a non-empty value has been sampled
    pub kind: Option<FieldKind>,

    /// Left margin in pixels reserved for row labels
    pub margin: f32,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, margin: f32) -> Self {
        Self {
            name: name.into(),
            kind: None,
            margin,
        }
    }

    /// Unclassified fields are handled as categorical
    pub fn is_numeric(&self) -> bool {
        self.kind == Some(FieldKind::Numeric)
    }
}

/// Classified fields of one dataset load, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldSchema {
    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).and_then(|f| f.kind)
    }

    pub fn is_numeric(&self, field: &str) -> bool {
        self.fields.get(field).map_or(false, FieldSpec::is_numeric)
    }

    /// Margin of a field, or `fallback` when the field is not configured
    pub fn margin_of(&self, field: &str, fallback: f32) -> f32 {
        self.fields.get(field).map_or(fallback, |f| f.margin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Classifies configured fields as numeric or categorical by sampling records
pub struct TypeInference {
    null_config: NullConfig,
}

impl TypeInference {
    /// Create a new inference pass with default empty-value patterns
    pub fn new() -> Self {
        Self {
            null_config: NullConfig::default(),
        }
    }

    /// Use custom empty-value patterns
    pub fn with_null_config(mut self, null_config: NullConfig) -> Self {
        self.null_config = null_config;
        self
    }

    /// Classify every field in `fields` against `records`.
    ///
    /// The first non-empty value of a field decides its kind. Fields without
    /// any non-empty value stay unclassified.
    pub fn infer<'a, I>(&self, fields: I, records: &[Record]) -> FieldSchema
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut schema = FieldSchema::default();

        for (name, margin) in fields {
            if schema.fields.contains_key(name) {
                continue;
            }

            let mut spec = FieldSpec::new(name, margin);
            spec.kind = self.classify(name, records);

            match spec.kind {
                Some(kind) => tracing::debug!("Field '{}' classified as {:?}", name, kind),
                None => tracing::warn!("Field '{}' has no non-empty values; treating as categorical", name),
            }

            schema.fields.insert(name.to_string(), spec);
        }

        tracing::info!(
            "Classified {} fields ({} numeric)",
            schema.len(),
            schema.iter().filter(|f| f.is_numeric()).count()
        );
        schema
    }

    fn classify(&self, field: &str, records: &[Record]) -> Option<FieldKind> {
        let sample = records
            .iter()
            .map(|r| r.get(field))
            .find(|v| !self.null_config.is_empty_value(v))?;

        Some(Self::kind_of_value(sample))
    }

    /// Kind of a single non-empty value
    pub fn kind_of_value(value: &Value) -> FieldKind {
        match value {
            Value::Number(_) => FieldKind::Numeric,
            Value::Text(text) if text.trim().parse::<f64>().map_or(false, f64::is_finite) => FieldKind::Numeric,
            _ => FieldKind::Categorical,
        }
    }
}

impl Default for TypeInference {
    fn default() -> Self {
        Self::new()
    }
}
