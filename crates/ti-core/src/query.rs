//! Cross-chart query propagation
//!
//! When one chart's selection changes it builds a [`GlobalQuery`] through the
//! [`QueryManager`], which remembers the query per panel and tells the caller
//! which registered panels have to re-evaluate their aggregation.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use indexmap::IndexSet;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::panel::PanelId;

/// Errors raised while building a query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("query descriptor is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("operator '{operator}' cannot be used with value {value}")]
    InvalidValue { operator: QueryOperator, value: Value },
}

/// Comparison applied by a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOperator {
    Equal,
    /// Value is an array of accepted values
    In,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryOperator::Equal => "equal",
            QueryOperator::In => "in",
        };
        f.write_str(name)
    }
}

/// Unvalidated query input.
///
/// Every field is optional so that partial descriptors coming from widgets or
/// from JSON can be rejected by [`QueryManager::create_query`] instead of being
/// broadcast half-built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub operator: Option<QueryOperator>,
}

impl QueryDescriptor {
    /// Descriptor with every field present
    pub fn new(index: impl Into<String>, value: Value, operator: QueryOperator) -> Self {
        Self {
            index: Some(index.into()),
            value: Some(value),
            operator: Some(operator),
        }
    }
}

/// Validated cross-chart filter unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalQuery {
    /// Field name, or comma separated field names for two-field charts
    pub index: String,
    pub value: Value,
    pub operator: QueryOperator,
}

impl GlobalQuery {
    /// Field names addressed by the query index
    pub fn fields(&self) -> Vec<&str> {
        self.index.split(',').map(str::trim).filter(|f| !f.is_empty()).collect()
    }

    /// Check whether a key value satisfies the query
    pub fn matches(&self, candidate: &Value) -> bool {
        match self.operator {
            QueryOperator::Equal => values_equal(candidate, &self.value),
            QueryOperator::In => self
                .value
                .as_array()
                .map(|accepted| accepted.iter().any(|v| values_equal(candidate, v)))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for GlobalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.index, self.operator, self.value)
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Coordinates filter propagation between panels
pub struct QueryManager {
    /// Last query built by each panel
    queries: Arc<RwLock<AHashMap<PanelId, GlobalQuery>>>,

    /// Most recent query across all panels
    latest: Arc<RwLock<Option<(PanelId, GlobalQuery)>>>,

    /// Panels that receive broadcasts, in registration order
    panels: Arc<RwLock<IndexSet<PanelId>>>,
}

impl QueryManager {
    /// Create a new query manager
    pub fn new() -> Self {
        Self {
            queries: Arc::new(RwLock::new(AHashMap::new())),
            latest: Arc::new(RwLock::new(None)),
            panels: Arc::new(RwLock::new(IndexSet::new())),
        }
    }

    /// Validate a descriptor and normalise it into a query
    pub fn create_query(&self, descriptor: QueryDescriptor) -> Result<GlobalQuery, QueryError> {
        let index = descriptor
            .index
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .ok_or(QueryError::MissingField("index"))?;
        let value = descriptor.value.ok_or(QueryError::MissingField("value"))?;
        let operator = descriptor.operator.ok_or(QueryError::MissingField("operator"))?;

        let shape_ok = match operator {
            QueryOperator::Equal => !value.is_array(),
            QueryOperator::In => value.is_array(),
        };
        if !shape_ok {
            return Err(QueryError::InvalidValue { operator, value });
        }

        Ok(GlobalQuery { index, value, operator })
    }

    /// Register a panel as a broadcast recipient
    pub fn register_panel(&self, panel: PanelId) {
        self.panels.write().insert(panel);
    }

    /// Remove a panel from the recipients
    pub fn unregister_panel(&self, panel: PanelId) {
        self.panels.write().shift_remove(&panel);
        self.queries.write().remove(&panel);
    }

    /// Registered panels in registration order
    pub fn registered_panels(&self) -> Vec<PanelId> {
        self.panels.read().iter().copied().collect()
    }

    /// Store the query built by `source` and return the panels to notify.
    ///
    /// Every registered panel is notified, the source included, so that it can
    /// refresh its own visibility state. Without `broadcast` the query is only
    /// recorded.
    pub fn set_global_query(&self, source: PanelId, query: GlobalQuery, broadcast: bool) -> Vec<PanelId> {
        tracing::debug!("{} set global query: {}", source, query);

        self.queries.write().insert(source, query.clone());
        *self.latest.write() = Some((source, query));

        if broadcast {
            self.registered_panels()
        } else {
            Vec::new()
        }
    }

    /// Last query built by a panel
    pub fn query_for(&self, panel: PanelId) -> Option<GlobalQuery> {
        self.queries.read().get(&panel).cloned()
    }

    /// Most recent query and the panel that built it
    pub fn latest(&self) -> Option<(PanelId, GlobalQuery)> {
        self.latest.read().clone()
    }

    /// Forget every stored query
    pub fn clear(&self) {
        self.queries.write().clear();
        *self.latest.write() = None;
    }
}

impl Default for QueryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_query_rejects_missing_fields() {
        let manager = QueryManager::new();

        let missing_index = QueryDescriptor {
            index: None,
            value: Some(json!("SEA")),
            operator: Some(QueryOperator::Equal),
        };
        assert_eq!(manager.create_query(missing_index), Err(QueryError::MissingField("index")));

        let blank_index = QueryDescriptor::new("  ", json!("SEA"), QueryOperator::Equal);
        assert_eq!(manager.create_query(blank_index), Err(QueryError::MissingField("index")));

        let missing_value = QueryDescriptor {
            index: Some("origin".into()),
            value: None,
            operator: Some(QueryOperator::Equal),
        };
        assert_eq!(manager.create_query(missing_value), Err(QueryError::MissingField("value")));

        let missing_operator = QueryDescriptor {
            index: Some("origin".into()),
            value: Some(json!("SEA")),
            operator: None,
        };
        assert_eq!(manager.create_query(missing_operator), Err(QueryError::MissingField("operator")));
    }

    #[test]
    fn test_create_query_rejects_badly_shaped_values() {
        let manager = QueryManager::new();
        let descriptor = QueryDescriptor::new("origin", json!("SEA"), QueryOperator::In);
        assert!(matches!(
            manager.create_query(descriptor),
            Err(QueryError::InvalidValue { operator: QueryOperator::In, .. })
        ));

        let descriptor = QueryDescriptor::new("origin", json!(["SEA"]), QueryOperator::Equal);
        assert!(manager.create_query(descriptor).is_err());
    }

    #[test]
    fn test_query_round_trips_through_broadcast() {
        let manager = QueryManager::new();
        manager.register_panel(PanelId(0));
        manager.register_panel(PanelId(1));

        let query = manager
            .create_query(QueryDescriptor::new(" origin ", json!("SEA"), QueryOperator::Equal))
            .unwrap();
        assert_eq!(query.index, "origin");

        let notified = manager.set_global_query(PanelId(1), query.clone(), true);
        assert_eq!(notified, vec![PanelId(0), PanelId(1)]);
        assert_eq!(manager.query_for(PanelId(1)), Some(query.clone()));
        assert_eq!(manager.latest(), Some((PanelId(1), query)));
    }

    #[test]
    fn test_set_without_broadcast_notifies_nobody() {
        let manager = QueryManager::new();
        manager.register_panel(PanelId(0));
        let query = manager
            .create_query(QueryDescriptor::new("origin", json!("PDX"), QueryOperator::Equal))
            .unwrap();
        assert!(manager.set_global_query(PanelId(0), query, false).is_empty());

        manager.unregister_panel(PanelId(0));
        assert!(manager.registered_panels().is_empty());
        assert!(manager.query_for(PanelId(0)).is_none());
    }

    #[test]
    fn test_query_matching() {
        let equal = GlobalQuery { index: "dep_delay".into(), value: json!(5), operator: QueryOperator::Equal };
        assert!(equal.matches(&json!(5.0)));
        assert!(!equal.matches(&json!(6)));

        let within = GlobalQuery { index: "origin".into(), value: json!(["SEA", "PDX"]), operator: QueryOperator::In };
        assert!(within.matches(&json!("PDX")));
        assert!(!within.matches(&json!("LAX")));

        let composite = GlobalQuery { index: "origin, dep_delay".into(), value: json!([1, 2]), operator: QueryOperator::In };
        assert_eq!(composite.fields(), vec!["origin", "dep_delay"]);
        assert!(composite.matches(&json!(2)));
        assert!(!composite.matches(&json!("2")));
    }

    #[test]
    fn test_descriptor_from_json() {
        let descriptor: QueryDescriptor =
            serde_json::from_str(r#"{"index": "origin", "value": "SEA", "operator": "equal"}"#).unwrap();
        let query = QueryManager::new().create_query(descriptor).unwrap();
        assert_eq!(query.operator, QueryOperator::Equal);

        let partial: QueryDescriptor = serde_json::from_str(r#"{"index": "origin"}"#).unwrap();
        assert!(QueryManager::new().create_query(partial).is_err());
    }
}
