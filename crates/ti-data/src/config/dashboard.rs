//! Panel and dashboard configuration

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::null_handling::NullConfig;
use crate::sources::http_source::DEFAULT_ENDPOINT;
use crate::DataError;

/// Margin used for fields without an entry in the margin map
pub const DEFAULT_MARGIN: f32 = 10.0;

/// Kind of chart a panel renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    ClusterMap,
}

impl ChartKind {
    /// Number of fields the chart groups by
    pub fn field_count(&self) -> usize {
        match self {
            ChartKind::Bar | ChartKind::Line => 1,
            ChartKind::Scatter | ChartKind::ClusterMap => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "BarChart",
            ChartKind::Line => "LineChart",
            ChartKind::Scatter => "ScatterPlot",
            ChartKind::ClusterMap => "ClusterMap",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Panel footprint in grid cells, written as `[cols, rows]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct GridSize {
    pub cols: usize,
    pub rows: usize,
}

impl GridSize {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }
}

impl From<[usize; 2]> for GridSize {
    fn from([cols, rows]: [usize; 2]) -> Self {
        Self { cols, rows }
    }
}

impl From<GridSize> for [usize; 2] {
    fn from(size: GridSize) -> Self {
        [size.cols, size.rows]
    }
}

/// One dashboard panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    /// One or two field names
    pub fields: Vec<String>,

    pub size: GridSize,

    /// Explicit chart kind; inferred from the fields when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartKind>,

    /// Title prefix, overrides the dashboard label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Logarithmic value axis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<bool>,

    /// Axis tick count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<usize>,
}

impl PanelSpec {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>, cols: usize, rows: usize) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            size: GridSize::new(cols, rows),
            chart: None,
            label: None,
            log: None,
            ticks: None,
        }
    }

    pub fn with_chart(mut self, chart: ChartKind) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_ticks(mut self, ticks: usize) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Panel fields joined with `,`
    pub fn index_name(&self) -> String {
        self.fields.join(",")
    }
}

/// Full dashboard description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Display name
    pub name: String,

    /// Data endpoint answering the record POST
    pub endpoint: String,

    /// Panels in placement order
    pub panels: Vec<PanelSpec>,

    /// Left label margin per field, in pixels
    pub field_margins: IndexMap<String, f32>,

    pub default_margin: f32,

    /// Free-text field shown on hover
    pub annotation_field: Option<String>,

    /// Noun used in cluster labels
    pub object_singular: String,
    pub object_plural: String,

    /// Default title prefix
    pub label: String,

    /// Pixel size of cluster map cells
    pub cluster_cell: f32,

    pub null_config: NullConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            name: "Dashboard".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            panels: Vec::new(),
            field_margins: IndexMap::new(),
            default_margin: DEFAULT_MARGIN,
            annotation_field: None,
            object_singular: "record".to_string(),
            object_plural: "records".to_string(),
            label: "#Records".to_string(),
            cluster_cell: 40.0,
            null_config: NullConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        tracing::info!("Loaded dashboard '{}' from {}", config.name, path.as_ref().display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check panel shapes
    pub fn validate(&self) -> Result<(), DataError> {
        if self.endpoint.trim().is_empty() {
            return Err(DataError::Config("endpoint is empty".to_string()));
        }

        for (idx, panel) in self.panels.iter().enumerate() {
            let fields = panel.fields.len();
            if !(1..=2).contains(&fields) {
                return Err(DataError::Config(format!(
                    "panel {} has {} fields, expected 1 or 2",
                    idx, fields
                )));
            }
            if panel.fields.iter().any(|f| f.trim().is_empty()) {
                return Err(DataError::Config(format!("panel {} has an empty field name", idx)));
            }
            if panel.size.cols == 0 || panel.size.rows == 0 {
                return Err(DataError::Config(format!("panel {} has an empty grid size", idx)));
            }
            if let Some(chart) = panel.chart {
                if chart.field_count() != fields {
                    return Err(DataError::Config(format!(
                        "panel {} declares {} but has {} fields",
                        idx, chart, fields
                    )));
                }
            }
            if matches!(panel.ticks, Some(0)) {
                return Err(DataError::Config(format!("panel {} has zero ticks", idx)));
            }
        }

        if self.cluster_cell <= 0.0 {
            return Err(DataError::Config("cluster cell size must be positive".to_string()));
        }
        Ok(())
    }

    /// Label margin of a field
    pub fn margin_for(&self, field: &str) -> f32 {
        self.field_margins.get(field).copied().unwrap_or(self.default_margin)
    }

    /// Fields to classify: the margin map keys, then every panel field
    pub fn configured_fields(&self) -> Vec<(&str, f32)> {
        let mut fields: IndexMap<&str, f32> = self
            .field_margins
            .iter()
            .map(|(name, margin)| (name.as_str(), *margin))
            .collect();
        for panel in &self.panels {
            for field in &panel.fields {
                fields.entry(field.as_str()).or_insert(self.default_margin);
            }
        }
        fields.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let text = r#"{
            "name": "Flights",
            "panels": [
                {"fields": ["origin"], "size": [1, 2]},
                {"fields": ["origin", "dep_delay"], "size": [2, 1], "chart": "scatter"}
            ],
            "field_margins": {"origin": 100},
            "annotation_field": "reason"
        }"#;

        let config = DashboardConfig::from_json_str(text).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.panels[0].size, GridSize::new(1, 2));
        assert_eq!(config.panels[1].chart, Some(ChartKind::Scatter));
        assert_eq!(config.margin_for("origin"), 100.0);
        assert_eq!(config.margin_for("dep_delay"), DEFAULT_MARGIN);

        let json = serde_json::to_value(&config.panels[0]).unwrap();
        assert_eq!(json["size"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_validation() {
        let mut config = DashboardConfig::default();
        config.panels.push(PanelSpec::new(["origin"], 1, 1));
        assert!(config.validate().is_ok());

        config.panels.push(PanelSpec::new(["origin"], 1, 1).with_chart(ChartKind::ClusterMap));
        assert!(matches!(config.validate(), Err(DataError::Config(_))));

        config.panels.pop();
        config.panels.push(PanelSpec::new(["a", "b", "c"], 1, 1));
        assert!(config.validate().is_err());

        config.panels.pop();
        config.panels.push(PanelSpec::new(["origin"], 0, 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configured_fields_order() {
        let mut config = DashboardConfig::default();
        config.field_margins.insert("origin".into(), 100.0);
        config.panels.push(PanelSpec::new(["dep_delay"], 2, 1));
        config.panels.push(PanelSpec::new(["origin", "dep_delay"], 2, 1));

        assert_eq!(config.configured_fields(), vec![("origin", 100.0), ("dep_delay", DEFAULT_MARGIN)]);
    }
}
