//! Built-in dashboard templates
//!
//! A template is a ready-made [`DashboardConfig`] for a known dataset plus a
//! matcher that scores how well a set of field names fits it. The binary uses
//! them for `--preset` and to pick a layout for a CSV file.

use std::fmt;

use ti_data::{ChartKind, DashboardConfig, PanelSpec};

/// Unique identifier for a template
pub type TemplateId = String;

/// A dashboard template
#[derive(Clone)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub matcher: Box<dyn TemplateMatcher>,
    pub config: DashboardConfig,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("panels", &self.config.panels.len())
            .finish()
    }
}

impl Template {
    /// How well the given fields fit this template (0.0 to 1.0)
    pub fn match_score(&self, fields: &[&str]) -> f64 {
        self.matcher.match_score(fields)
    }
}

/// Trait for template matching
pub trait TemplateMatcher: Send + Sync {
    /// Calculate how well this template matches the given fields (0.0 to 1.0)
    fn match_score(&self, fields: &[&str]) -> f64;

    /// Clone the matcher
    fn clone_box(&self) -> Box<dyn TemplateMatcher>;
}

impl Clone for Box<dyn TemplateMatcher> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Scores by the share of required fields present
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    required: Vec<String>,
}

impl FieldMatcher {
    pub fn new<S: Into<String>>(required: impl IntoIterator<Item = S>) -> Self {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Every field any panel of the config uses
    pub fn for_config(config: &DashboardConfig) -> Self {
        let mut required: Vec<String> = Vec::new();
        for field in config.panels.iter().flat_map(|p| p.fields.iter()) {
            if !required.contains(field) {
                required.push(field.clone());
            }
        }
        Self { required }
    }
}

impl TemplateMatcher for FieldMatcher {
    fn match_score(&self, fields: &[&str]) -> f64 {
        if self.required.is_empty() {
            return 0.0;
        }
        let present = self
            .required
            .iter()
            .filter(|r| fields.iter().any(|f| f.eq_ignore_ascii_case(r)))
            .count();
        present as f64 / self.required.len() as f64
    }

    fn clone_box(&self) -> Box<dyn TemplateMatcher> {
        Box::new(self.clone())
    }
}

/// Airline on-time data: delays, distance and airports
pub fn flights() -> Template {
    let mut config = DashboardConfig {
        name: "Flights".to_string(),
        annotation_field: Some("reason".to_string()),
        object_singular: "flight".to_string(),
        object_plural: "flights".to_string(),
        label: "#Flights".to_string(),
        ..DashboardConfig::default()
    };
    for (field, margin) in [
        ("origin_state", 30.0),
        ("origin", 100.0),
        ("destination", 100.0),
        ("destination_state", 30.0),
        ("distance", 50.0),
        ("dep_delay", 50.0),
        ("arr_delay", 50.0),
        ("flight", 50.0),
    ] {
        config.field_margins.insert(field.to_string(), margin);
    }
    config.panels = vec![
        PanelSpec::new(["dep_delay"], 2, 1),
        PanelSpec::new(["origin"], 1, 2),
        PanelSpec::new(["destination"], 1, 2),
        PanelSpec::new(["arr_delay"], 2, 1),
        PanelSpec::new(["distance"], 2, 1).with_log(false),
        PanelSpec::new(["origin_state"], 1, 1),
        PanelSpec::new(["destination_state"], 1, 1),
        PanelSpec::new(["origin", "dep_delay"], 2, 1),
        PanelSpec::new(["destination", "arr_delay"], 2, 1),
    ];

    Template {
        id: "flights".to_string(),
        name: "Flights".to_string(),
        description: "Departure and arrival delays by airport and state".to_string(),
        matcher: Box::new(FieldMatcher::for_config(&config)),
        config,
    }
}

/// Building permits with a location, a type and a free-text description
pub fn building() -> Template {
    let mut config = DashboardConfig {
        name: "Building permits".to_string(),
        annotation_field: Some("description".to_string()),
        object_singular: "permit".to_string(),
        object_plural: "permits".to_string(),
        label: "#Permits".to_string(),
        ..DashboardConfig::default()
    };
    for (field, margin) in [("subtype", 100.0), ("contact", 100.0), ("date", 60.0)] {
        config.field_margins.insert(field.to_string(), margin);
    }
    config.panels = vec![
        PanelSpec::new(["latitude", "longitude"], 2, 2).with_chart(ChartKind::ClusterMap),
        PanelSpec::new(["subtype"], 1, 2),
        PanelSpec::new(["contact"], 1, 2),
        PanelSpec::new(["date"], 2, 1),
        PanelSpec::new(["subtype", "contact"], 2, 1),
    ];

    Template {
        id: "building".to_string(),
        name: "Building permits".to_string(),
        description: "Permit clusters on a map with type and contact breakdowns".to_string(),
        matcher: Box::new(FieldMatcher::for_config(&config)),
        config,
    }
}

/// Every built-in template
pub fn builtin_templates() -> Vec<Template> {
    vec![flights(), building()]
}

/// Template by id, case-insensitive
pub fn find(id: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

/// Highest-scoring template for the given fields, if any field matches
pub fn best_match(fields: &[&str]) -> Option<Template> {
    builtin_templates()
        .into_iter()
        .map(|t| (t.match_score(fields), t))
        .filter(|(score, _)| *score > 0.0)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(score, t)| {
            tracing::debug!("Template '{}' matched with score {:.2}", t.id, score);
            t
        })
}
