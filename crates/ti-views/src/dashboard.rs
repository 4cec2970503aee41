//! Dashboard state: the panels, their widgets and everything they share

use egui::{Modifiers, Pos2, Rect, Vec2};
use egui_plot::PlotPoint;
use thiserror::Error;
use ti_core::{AnnotationId, AnnotationStore, DashboardEvent, EventBus, PanelId, QueryError, QueryManager};
use ti_data::{
    AggregationIndex, AggregationKey, AnnotationBinner, BinnedAnnotations, ChartKind, DashboardConfig, DataError,
    DimensionKey, FieldSchema, PanelSpec, Record, TypeInference,
};

use crate::chart::{ChartAction, ChartConfig, ChartWidget};
use crate::layout::{select_chart, GridLayout, GridLayoutConfig};
use crate::overlay::{Overlay, Tooltip};
use crate::plots::{BarChart, ClusterMap, LineChart, ScatterPlot};

/// Scatter plot axes never get less room than this
const MIN_SCATTER_MARGIN: f32 = 25.0;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Unknown panel {0}")]
    UnknownPanel(PanelId),

    #[error("Panel {0} has no chart yet")]
    NotReady(PanelId),

    #[error("Configuration error: {0}")]
    Config(#[from] DataError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

/// Owns every panel's widget together with the shared index, query manager
/// and annotation state.
pub struct Dashboard {
    config: DashboardConfig,
    layout: GridLayout,
    viewport: Vec2,
    schema: Option<FieldSchema>,
    index: Option<AggregationIndex>,
    /// One slot per panel, `None` until data has arrived
    visualizations: Vec<Option<Box<dyn ChartWidget>>>,
    query_manager: QueryManager,
    annotations: AnnotationStore,
    binner: AnnotationBinner,
    binned: Vec<BinnedAnnotations>,
    overlay: Overlay,
    events: EventBus,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, viewport: Vec2) -> Result<Self, ViewError> {
        config.validate()?;

        let layout = Self::pack(&config, viewport);
        let panels = config.panels.len();
        let binner = AnnotationBinner::new(config.annotation_field.clone());

        tracing::info!("Dashboard '{}' with {} panels", config.name, panels);
        Ok(Self {
            config,
            layout,
            viewport,
            schema: None,
            index: None,
            visualizations: (0..panels).map(|_| None).collect(),
            query_manager: QueryManager::new(),
            annotations: AnnotationStore::new(),
            binner,
            binned: vec![BinnedAnnotations::default(); panels],
            overlay: Overlay::new(),
            events: EventBus::new(),
        })
    }

    fn pack(config: &DashboardConfig, viewport: Vec2) -> GridLayout {
        let sizes: Vec<_> = config.panels.iter().map(|p| p.size).collect();
        GridLayout::pack(GridLayoutConfig::for_viewport(viewport.x, viewport.y), viewport.x, &sizes)
    }

    /// Populate the dashboard from a fetch result.
    ///
    /// A failure is logged and leaves every panel empty. Data arriving again
    /// replaces the index and rebuilds every chart.
    pub fn handle_fetch_result(&mut self, source_name: &str, result: Result<Vec<Record>, DataError>) {
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to load data from {}: {}", source_name, e);
                self.events.publish(DashboardEvent::DataLoadFailed {
                    source_name: source_name.to_string(),
                    error: e.to_string(),
                });
                return;
            }
        };

        if self.index.is_some() {
            tracing::info!("Reloading dashboard data from {}", source_name);
            self.reset();
        }

        let schema = TypeInference::new()
            .with_null_config(self.config.null_config.clone())
            .infer(self.config.configured_fields(), &records);
        let row_count = records.len();
        let field_count = schema.len();
        self.schema = Some(schema);
        self.index = Some(AggregationIndex::new(records));

        for panel in (0..self.config.panels.len()).map(PanelId) {
            if let Err(e) = self.create_widget(panel) {
                tracing::warn!("Could not create chart for {}: {}", panel, e);
            }
        }
        self.rebin();

        tracing::info!("Loaded {} records with {} fields from {}", row_count, field_count, source_name);
        self.events.publish(DashboardEvent::DataLoaded {
            source_name: source_name.to_string(),
            row_count,
            field_count,
        });
    }

    fn reset(&mut self) {
        for panel in (0..self.visualizations.len()).map(PanelId) {
            self.query_manager.unregister_panel(panel);
        }
        self.query_manager.clear();
        self.visualizations.iter_mut().for_each(|slot| *slot = None);
        self.binned.iter_mut().for_each(|b| *b = BinnedAnnotations::default());
        self.overlay = Overlay::new();
    }

    fn create_widget(&mut self, panel: PanelId) -> Result<(), ViewError> {
        let spec = self.config.panels.get(panel.index()).ok_or(ViewError::UnknownPanel(panel))?;
        let index = self.index.as_ref().ok_or(ViewError::NotReady(panel))?;
        let schema = self.schema.as_ref().ok_or(ViewError::NotReady(panel))?;

        let dimension_key = DimensionKey::from_fields(&spec.fields)
            .ok_or_else(|| DataError::Config(format!("{} needs one or two fields", panel)))?;
        let dimension = index.dimension(dimension_key);
        let kind = select_chart(spec, schema);
        let chart_config = self.chart_config(panel, spec, kind, schema);

        let mut widget: Box<dyn ChartWidget> = match kind {
            ChartKind::Bar => Box::new(BarChart::new(chart_config, dimension)),
            ChartKind::Line => Box::new(LineChart::new(chart_config, dimension)),
            ChartKind::Scatter => Box::new(ScatterPlot::new(chart_config, dimension)),
            ChartKind::ClusterMap => Box::new(ClusterMap::new(chart_config, dimension)),
        };
        if let Some(rect) = self.layout.rect(panel) {
            widget.resize(rect.size());
        }
        widget.render();

        let annotated: Vec<AggregationKey> = widget
            .scene()
            .foreground
            .keys()
            .flat_map(|k| widget.members(k))
            .filter(|k| self.annotations.is_annotated(panel, &k.to_string()))
            .collect();
        for key in annotated {
            widget.mark_annotated(key);
        }

        tracing::debug!("Created {} for {} over {}", kind, panel, spec.index_name());
        self.query_manager.register_panel(panel);
        self.events.publish(DashboardEvent::PanelCreated {
            panel,
            chart_kind: kind.name().to_string(),
        });
        self.visualizations[panel.index()] = Some(widget);
        Ok(())
    }

    fn chart_config(&self, panel: PanelId, spec: &PanelSpec, kind: ChartKind, schema: &FieldSchema) -> ChartConfig {
        let label = spec.label.clone().unwrap_or_else(|| self.config.label.clone());
        let mut builder = ChartConfig::builder(panel, spec.fields.iter().cloned()).label(label);
        for (n, field) in spec.fields.iter().enumerate() {
            builder = builder.field_kind(n, schema.kind_of(field));
        }

        let first = spec.fields.first().map(String::as_str).unwrap_or("");
        let builder = match kind {
            ChartKind::Bar => builder
                .margin_left(self.config.margin_for(first))
                .ticks(spec.ticks.unwrap_or(5))
                .log(spec.log.unwrap_or(false)),
            ChartKind::Line => builder.ticks(spec.ticks.unwrap_or(15)).log(spec.log.unwrap_or(true)),
            ChartKind::Scatter => {
                let second = spec.fields.get(1).map(String::as_str).unwrap_or("");
                builder
                    .margin_left(self.config.margin_for(first).max(MIN_SCATTER_MARGIN))
                    .margin_top(self.config.margin_for(second).max(MIN_SCATTER_MARGIN))
                    .ticks(spec.ticks.unwrap_or(5))
            }
            ChartKind::ClusterMap => builder
                .objects(self.config.object_singular.clone(), self.config.object_plural.clone())
                .cell_size(self.config.cluster_cell),
        };
        builder.build()
    }

    fn widget(&self, panel: PanelId) -> Result<&dyn ChartWidget, ViewError> {
        self.visualizations
            .get(panel.index())
            .ok_or(ViewError::UnknownPanel(panel))?
            .as_deref()
            .ok_or(ViewError::NotReady(panel))
    }

    fn widget_mut(&mut self, panel: PanelId) -> Result<&mut Box<dyn ChartWidget>, ViewError> {
        self.visualizations
            .get_mut(panel.index())
            .ok_or(ViewError::UnknownPanel(panel))?
            .as_mut()
            .ok_or(ViewError::NotReady(panel))
    }

    /// Re-run the annotation binner for every chart
    pub fn rebin(&mut self) {
        for (slot, binned) in self.visualizations.iter().zip(self.binned.iter_mut()) {
            let Some(widget) = slot else {
                continue;
            };
            *binned = match self.binner.bin(widget.dimension()) {
                Ok(b) => b,
                Err(DataError::NoAnnotationField) => BinnedAnnotations::default(),
                Err(e) => {
                    tracing::warn!("Annotation binning failed for {}: {}", widget.panel(), e);
                    BinnedAnnotations::default()
                }
            };
        }
    }

    /// Click at a plot point of a panel. `page_pos` places the tooltip and
    /// the annotation box.
    pub fn click(
        &mut self,
        panel: PanelId,
        point: PlotPoint,
        page_pos: Pos2,
        modifiers: Modifiers,
    ) -> Result<ChartAction, ViewError> {
        let action = self.widget_mut(panel)?.click(point, modifiers);

        match &action {
            ChartAction::None => {}
            ChartAction::Toggled {
                descriptor,
                mark,
                selected,
                ..
            } => {
                let query = self.query_manager.create_query(descriptor.clone())?;
                let notified = self.query_manager.set_global_query(panel, query.clone(), true);
                for target in &notified {
                    if let Ok(widget) = self.widget_mut(*target) {
                        widget.receive_query(&query);
                    }
                }
                self.rebin();

                // A selected mark shows its note, a deselected one drops it
                if *selected {
                    let text = self.tooltip_text(panel, mark)?;
                    self.overlay.show_tooltip(panel, mark.clone(), page_pos, text);
                } else {
                    self.overlay.hide_tooltip();
                }

                let matching = self.index.as_ref().map(|i| i.count_matching(&query)).unwrap_or(0);
                self.events.publish(DashboardEvent::FilterChanged {
                    panel,
                    query,
                    notified: notified.len(),
                    matching,
                });
            }
            ChartAction::Annotate { key } => {
                if let Some(previous) = self.overlay.open_annotation_box(panel, key.clone(), page_pos) {
                    if let Ok(widget) = self.widget_mut(previous.panel) {
                        widget.set_pending(None);
                    }
                }
                self.widget_mut(panel)?.set_pending(Some(key.clone()));
            }
        }
        Ok(action)
    }

    /// Show the tooltip of the mark at a plot point, or hide it
    pub fn hover(&mut self, panel: PanelId, point: PlotPoint, page_pos: Pos2) -> Result<Option<&Tooltip>, ViewError> {
        let Some(hit) = self.widget(panel)?.hover(point) else {
            self.overlay.hide_tooltip();
            return Ok(None);
        };
        let text = self.tooltip_text(panel, &hit.key)?;
        self.overlay.show_tooltip(panel, hit.key, page_pos, text);
        Ok(self.overlay.tooltip())
    }

    /// Binned annotation of the mark, else the latest manual one, else nothing.
    /// Manual annotations may be stored under the mark or under one of the
    /// keys it stands for.
    fn tooltip_text(&self, panel: PanelId, key: &AggregationKey) -> Result<String, ViewError> {
        let widget = self.widget(panel)?;
        let binned = &self.binned[panel.index()];
        let members = widget.members(key);
        let text = members
            .iter()
            .find_map(|member| binned.first(member))
            .map(str::to_string)
            .or_else(|| {
                std::iter::once(key)
                    .chain(members.iter())
                    .find_map(|k| self.annotations.for_mark(panel, &k.to_string()).last().copied())
                    .map(|a| a.text.clone())
            })
            .unwrap_or_default();
        Ok(text)
    }

    pub fn hover_end(&mut self) {
        self.overlay.hide_tooltip();
    }

    pub fn set_annotation_draft(&mut self, text: impl Into<String>) {
        if let Some(annotation_box) = self.overlay.annotation_box_mut() {
            annotation_box.draft = text.into();
        }
    }

    /// Close the annotation box and store its text. Blank text stores nothing.
    pub fn confirm_annotation(&mut self, text: &str) -> Option<AnnotationId> {
        let annotation_box = self.overlay.close_annotation_box()?;
        let panel = annotation_box.panel;
        let key_text = annotation_box.key.to_string();

        let id = self.annotations.add(
            panel,
            key_text.clone(),
            (annotation_box.page_pos.x, annotation_box.page_pos.y),
            text,
        );

        if let Ok(widget) = self.widget_mut(panel) {
            widget.set_pending(None);
            if id.is_some() {
                widget.mark_annotated(annotation_box.key.clone());
            }
        }
        if id.is_some() {
            self.events.publish(DashboardEvent::AnnotationSaved { panel, key: key_text });
        }
        id
    }

    /// Close the annotation box without storing anything
    pub fn cancel_annotation(&mut self) {
        if let Some(annotation_box) = self.overlay.close_annotation_box() {
            if let Ok(widget) = self.widget_mut(annotation_box.panel) {
                widget.set_pending(None);
            }
        }
    }

    /// Re-pack the grid for a new viewport and re-render every chart
    pub fn resize(&mut self, width: f32, height: f32) {
        let viewport = Vec2::new(width, height);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.layout = Self::pack(&self.config, viewport);

        for (i, slot) in self.visualizations.iter_mut().enumerate() {
            if let (Some(widget), Some(rect)) = (slot.as_mut(), self.layout.rect(PanelId(i))) {
                widget.resize(rect.size());
                widget.render();
            }
        }
        tracing::debug!("Resized dashboard to {}x{}", width, height);
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn panel_rect(&self, panel: PanelId) -> Option<Rect> {
        self.layout.rect(panel)
    }

    pub fn schema(&self) -> Option<&FieldSchema> {
        self.schema.as_ref()
    }

    pub fn index(&self) -> Option<&AggregationIndex> {
        self.index.as_ref()
    }

    /// Whether data has arrived
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn visualizations(&self) -> &[Option<Box<dyn ChartWidget>>] {
        &self.visualizations
    }

    pub fn visualization(&self, panel: PanelId) -> Option<&dyn ChartWidget> {
        self.widget(panel).ok()
    }

    pub fn query_manager(&self) -> &QueryManager {
        &self.query_manager
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn binned(&self, panel: PanelId) -> Option<&BinnedAnnotations> {
        self.binned.get(panel.index())
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use ti_core::{EventKind, QueryDescriptor, QueryOperator};
    use ti_data::Value;

    fn config() -> DashboardConfig {
        let mut config = DashboardConfig {
            panels: vec![PanelSpec::new(["dep_delay"], 2, 1), PanelSpec::new(["origin"], 1, 2)],
            annotation_field: Some("reason".to_string()),
            ..DashboardConfig::default()
        };
        config.field_margins.insert("origin".to_string(), 100.0);
        config.field_margins.insert("dep_delay".to_string(), 50.0);
        config
    }

    fn flights() -> Vec<Record> {
        vec![
            Record::from_pairs([
                ("origin", Value::from("SEA")),
                ("dep_delay", Value::from(5.0)),
                ("reason", Value::from("weather")),
            ]),
            Record::from_pairs([("origin", Value::from("SEA")), ("dep_delay", Value::from(10.0))]),
            Record::from_pairs([("origin", Value::from("PDX")), ("dep_delay", Value::from(3.0))]),
        ]
    }

    fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new(config(), Vec2::new(1600.0, 1000.0)).unwrap();
        dashboard.handle_fetch_result("test", Ok(flights()));
        dashboard
    }

    fn bar_center(dashboard: &Dashboard, key: &str) -> PlotPoint {
        dashboard
            .visualization(PanelId(1))
            .unwrap()
            .scene()
            .foreground
            .get(&AggregationKey::from(key))
            .unwrap()
            .shape
            .center()
    }

    #[test]
    fn test_fetch_failure_leaves_panels_empty() {
        let mut dashboard = Dashboard::new(config(), Vec2::new(800.0, 600.0)).unwrap();
        let failures = Arc::new(Mutex::new(0));
        let sink = failures.clone();
        dashboard
            .events()
            .subscribe(&[EventKind::DataLoadFailed], move |_| *sink.lock() += 1);

        dashboard.handle_fetch_result("test", Err(DataError::Status(503)));

        assert!(!dashboard.is_ready());
        assert!(dashboard.visualizations().iter().all(Option::is_none));
        assert_eq!(*failures.lock(), 1);
        assert!(matches!(
            dashboard.click(PanelId(0), PlotPoint::new(0.0, 0.0), Pos2::ZERO, Modifiers::NONE),
            Err(ViewError::NotReady(_))
        ));
        assert!(matches!(
            dashboard.click(PanelId(7), PlotPoint::new(0.0, 0.0), Pos2::ZERO, Modifiers::NONE),
            Err(ViewError::UnknownPanel(_))
        ));
    }

    #[test]
    fn test_widgets_follow_inferred_types() {
        let dashboard = loaded();
        assert!(dashboard.schema().unwrap().is_numeric("dep_delay"));

        let kinds: Vec<ChartKind> = dashboard.visualizations().iter().flatten().map(|w| w.kind()).collect();
        assert_eq!(kinds, vec![ChartKind::Line, ChartKind::Bar]);

        let bar = dashboard.visualization(PanelId(1)).unwrap();
        assert_eq!(bar.scene().foreground.len(), 2);
        assert_eq!(dashboard.query_manager().registered_panels(), vec![PanelId(0), PanelId(1)]);
    }

    #[test]
    fn test_click_broadcasts_to_other_charts() {
        let mut dashboard = loaded();
        let matching = Arc::new(Mutex::new(Vec::new()));
        let sink = matching.clone();
        dashboard.events().subscribe(&[EventKind::FilterChanged], move |event| {
            if let DashboardEvent::FilterChanged { matching, notified, .. } = event {
                sink.lock().push((*matching, *notified));
            }
        });
        let renders = dashboard.visualization(PanelId(0)).unwrap().core().render_count;
        let center = bar_center(&dashboard, "PDX");

        let action = dashboard.click(PanelId(1), center, Pos2::ZERO, Modifiers::NONE).unwrap();
        assert!(matches!(action, ChartAction::Toggled { selected: true, .. }));

        let line = dashboard.visualization(PanelId(0)).unwrap();
        assert_eq!(line.core().render_count, renders + 1);
        assert_eq!(line.scene().foreground.len(), 1);

        let (source, query) = dashboard.query_manager().latest().unwrap();
        assert_eq!(source, PanelId(1));
        assert_eq!(query.index, "origin");
        assert_eq!(query.value, serde_json::json!("PDX"));
        assert_eq!(*matching.lock(), vec![(1, 2)]);
    }

    #[test]
    fn test_query_round_trip() {
        let dashboard = loaded();
        let manager = dashboard.query_manager();
        let query = manager
            .create_query(QueryDescriptor::new("origin", serde_json::json!(["SEA"]), QueryOperator::In))
            .unwrap();

        let notified = manager.set_global_query(PanelId(1), query.clone(), false);
        assert!(notified.is_empty());
        assert_eq!(manager.query_for(PanelId(1)), Some(query));
    }

    #[test]
    fn test_alt_click_opens_one_box_and_empty_text_is_dropped() {
        let mut dashboard = loaded();
        let sea = bar_center(&dashboard, "SEA");
        let pdx = bar_center(&dashboard, "PDX");

        let action = dashboard.click(PanelId(1), sea, Pos2::new(300.0, 300.0), Modifiers::ALT).unwrap();
        assert_eq!(action, ChartAction::Annotate { key: AggregationKey::from("SEA") });
        dashboard.click(PanelId(1), pdx, Pos2::new(300.0, 330.0), Modifiers::ALT).unwrap();

        let open = dashboard.overlay().annotation_box().unwrap();
        assert_eq!(open.key, AggregationKey::from("PDX"));
        assert_eq!(open.button_label(), "Close");

        // Only the mark with the open box keeps the selection colour
        let bar = dashboard.visualization(PanelId(1)).unwrap();
        let selection = bar.config().theme().selection;
        let selected: Vec<_> = bar
            .scene()
            .foreground
            .iter()
            .filter(|m| m.style.fill == selection)
            .map(|m| m.key.clone())
            .collect();
        assert_eq!(selected, vec![AggregationKey::from("PDX")]);

        assert!(dashboard.confirm_annotation("  ").is_none());
        assert!(dashboard.annotations().is_empty());
        assert!(dashboard.overlay().annotation_box().is_none());
        // The click did not filter anything
        assert_eq!(dashboard.index().unwrap().filtered_len(), 3);
    }

    #[test]
    fn test_confirmed_annotation_is_stored_and_shown() {
        let mut dashboard = loaded();
        let pdx = bar_center(&dashboard, "PDX");

        dashboard.click(PanelId(1), pdx, Pos2::new(300.0, 300.0), Modifiers::ALT).unwrap();
        dashboard.set_annotation_draft("late crew");
        assert_eq!(dashboard.overlay().annotation_box().unwrap().button_label(), "Add");
        assert!(dashboard.confirm_annotation("late crew").is_some());
        assert!(dashboard.annotations().is_annotated(PanelId(1), "PDX"));

        let tooltip = dashboard.hover(PanelId(1), pdx, Pos2::new(300.0, 300.0)).unwrap().unwrap();
        assert_eq!(tooltip.text, "late crew");
    }

    #[test]
    fn test_selecting_an_annotated_mark_shows_its_note() {
        let mut dashboard = loaded();
        let pdx = bar_center(&dashboard, "PDX");
        dashboard.click(PanelId(1), pdx, Pos2::new(300.0, 300.0), Modifiers::ALT).unwrap();
        assert!(dashboard.confirm_annotation("late crew").is_some());

        let action = dashboard.click(PanelId(1), pdx, Pos2::new(320.0, 340.0), Modifiers::NONE).unwrap();
        assert!(matches!(action, ChartAction::Toggled { selected: true, .. }));
        let tooltip = dashboard.overlay().tooltip().cloned();
        assert_eq!(tooltip.as_ref().map(|t| t.text.as_str()), Some("late crew"));
        assert_eq!(tooltip.map(|t| t.key), Some(AggregationKey::from("PDX")));

        let action = dashboard.click(PanelId(1), pdx, Pos2::new(320.0, 340.0), Modifiers::NONE).unwrap();
        assert!(matches!(action, ChartAction::Toggled { selected: false, .. }));
        assert!(dashboard.overlay().tooltip().is_none());
    }

    #[test]
    fn test_hover_shows_binned_annotation() {
        let mut dashboard = loaded();
        let sea = bar_center(&dashboard, "SEA");

        let tooltip = dashboard.hover(PanelId(1), sea, Pos2::new(400.0, 400.0)).unwrap().unwrap();
        assert_eq!(tooltip.text, "weather");
        assert_eq!(tooltip.anchor, Pos2::new(380.0, 360.0));

        assert!(dashboard.hover(PanelId(1), PlotPoint::new(-50.0, -50.0), Pos2::ZERO).unwrap().is_none());
        assert!(dashboard.overlay().tooltip().is_none());
    }

    #[test]
    fn test_refetch_rebuilds_charts() {
        let mut dashboard = loaded();
        let pdx = bar_center(&dashboard, "PDX");
        dashboard.click(PanelId(1), pdx, Pos2::ZERO, Modifiers::NONE).unwrap();

        dashboard.handle_fetch_result("test", Ok(flights()));
        assert!(dashboard.query_manager().latest().is_none());
        assert_eq!(dashboard.index().unwrap().filtered_len(), 3);
        let bar = dashboard.visualization(PanelId(1)).unwrap();
        assert!(bar.filters().is_empty());
        assert_eq!(bar.core().render_count, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DashboardConfig {
            panels: vec![PanelSpec::new(["origin"], 1, 1).with_chart(ChartKind::Scatter)],
            ..DashboardConfig::default()
        };
        assert!(matches!(
            Dashboard::new(config, Vec2::new(800.0, 600.0)),
            Err(ViewError::Config(_))
        ));
    }
}
