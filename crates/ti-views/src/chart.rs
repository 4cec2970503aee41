//! Chart widget abstraction and shared chart state

use ahash::AHashSet;
use egui::{Color32, Modifiers, Vec2};
use egui_plot::PlotPoint;
use ti_core::{GlobalQuery, PanelId, QueryDescriptor, QueryOperator};
use ti_data::{AggregationKey, Bucket, ChartKind, Dimension, FieldKind};

use crate::filter::FilterSet;
use crate::plots::utils::Theme;
use crate::scene::{Hit, HitTarget, Scene};

/// Space around the plot area, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 25.0,
            right: 10.0,
            bottom: 20.0,
            left: 10.0,
        }
    }
}

/// Per-chart configuration, built with [`ChartConfig::builder`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    panel: PanelId,
    fields: Vec<String>,
    field_kinds: Vec<Option<FieldKind>>,
    margin: Margin,
    ticks: usize,
    label: String,
    log: bool,
    object_singular: String,
    object_plural: String,
    cell_size: f32,
    theme: Theme,
}

impl ChartConfig {
    pub fn builder<S: Into<String>>(panel: PanelId, fields: impl IntoIterator<Item = S>) -> ChartConfigBuilder {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        ChartConfigBuilder {
            config: ChartConfig {
                panel,
                field_kinds: vec![None; fields.len()],
                fields,
                margin: Margin::default(),
                ticks: 2,
                label: String::new(),
                log: false,
                object_singular: "record".to_string(),
                object_plural: "records".to_string(),
                cell_size: 40.0,
                theme: Theme::default(),
            },
        }
    }

    pub fn panel(&self) -> PanelId {
        self.panel
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The n-th field, or an empty string
    pub fn field(&self, n: usize) -> &str {
        self.fields.get(n).map(String::as_str).unwrap_or("")
    }

    pub fn is_numeric(&self, n: usize) -> bool {
        matches!(self.field_kinds.get(n), Some(Some(FieldKind::Numeric)))
    }

    /// Query index: the fields joined with `,`
    pub fn index_name(&self) -> String {
        self.fields.join(",")
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn log(&self) -> bool {
        self.log
    }

    pub fn object_singular(&self) -> &str {
        &self.object_singular
    }

    pub fn object_plural(&self) -> &str {
        &self.object_plural
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Title text: label followed by the fields
    pub fn title(&self) -> String {
        let fields = self.fields.join(" / ");
        if self.label.is_empty() {
            fields
        } else {
            format!("{} {}", self.label, fields)
        }
    }
}

pub struct ChartConfigBuilder {
    config: ChartConfig,
}

impl ChartConfigBuilder {
    pub fn margin(mut self, margin: Margin) -> Self {
        self.config.margin = margin;
        self
    }

    pub fn margin_left(mut self, left: f32) -> Self {
        self.config.margin.left = left;
        self
    }

    pub fn margin_top(mut self, top: f32) -> Self {
        self.config.margin.top = top;
        self
    }

    pub fn margin_bottom(mut self, bottom: f32) -> Self {
        self.config.margin.bottom = bottom;
        self
    }

    pub fn ticks(mut self, ticks: usize) -> Self {
        self.config.ticks = ticks.max(1);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    pub fn log(mut self, log: bool) -> Self {
        self.config.log = log;
        self
    }

    pub fn field_kind(mut self, n: usize, kind: Option<FieldKind>) -> Self {
        if let Some(slot) = self.config.field_kinds.get_mut(n) {
            *slot = kind;
        }
        self
    }

    pub fn objects(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.config.object_singular = singular.into();
        self.config.object_plural = plural.into();
        self
    }

    pub fn cell_size(mut self, cell_size: f32) -> Self {
        self.config.cell_size = cell_size.max(1.0);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn build(self) -> ChartConfig {
        self.config
    }
}

/// Result of a click on a chart
#[derive(Debug, Clone, PartialEq)]
pub enum ChartAction {
    /// Nothing was hit
    None,
    /// The selection changed and a query should be broadcast
    Toggled {
        descriptor: QueryDescriptor,
        /// The clicked mark
        mark: AggregationKey,
        /// Keys the mark stands for
        keys: Vec<AggregationKey>,
        /// Whether the keys are selected after the click
        selected: bool,
    },
    /// Modifier click: open an annotation box for the mark
    Annotate { key: AggregationKey },
}

/// Common interface of every chart kind
pub trait ChartWidget: Send + Sync {
    fn kind(&self) -> ChartKind;

    /// Shared chart state
    fn core(&self) -> &ChartCore;
    fn core_mut(&mut self) -> &mut ChartCore;

    /// Pull aggregates and reconcile the scene; safe to call repeatedly
    fn render(&mut self);

    fn panel(&self) -> PanelId {
        self.core().config.panel()
    }

    fn config(&self) -> &ChartConfig {
        &self.core().config
    }

    fn scene(&self) -> &Scene {
        &self.core().scene
    }

    fn filters(&self) -> &FilterSet {
        &self.core().filters
    }

    fn dimension(&self) -> &Dimension {
        &self.core().dimension
    }

    /// Bucket snapshot taken on the first render
    fn background(&self) -> Option<&[Bucket]> {
        self.core().background.as_deref()
    }

    /// Container size in pixels; takes effect on the next render
    fn resize(&mut self, size: Vec2) {
        self.core_mut().container = size;
    }

    /// Keys a mark stands for
    fn members(&self, mark: &AggregationKey) -> Vec<AggregationKey> {
        vec![mark.clone()]
    }

    /// Key an annotation on a mark is stored under
    fn annotation_key(&self, mark: &AggregationKey) -> AggregationKey {
        mark.clone()
    }

    /// Resolve a click at a plot point
    fn click(&mut self, point: PlotPoint, modifiers: Modifiers) -> ChartAction {
        let Some(hit) = self.scene().hit_test(point) else {
            return ChartAction::None;
        };

        if modifiers.alt {
            if hit.target != HitTarget::Mark {
                return ChartAction::None;
            }
            return ChartAction::Annotate {
                key: self.annotation_key(&hit.key),
            };
        }

        let keys = self.members(&hit.key);
        self.core_mut().toggle(&hit.key, keys)
    }

    /// Mark at a plot point, for hover
    fn hover(&self, point: PlotPoint) -> Option<Hit> {
        self.scene().mark_at(point).map(|m| Hit {
            key: m.key.clone(),
            target: HitTarget::Mark,
        })
    }

    /// A broadcast query reached this chart
    fn receive_query(&mut self, query: &GlobalQuery) {
        tracing::trace!("{} received {}", self.panel(), query);
        self.render();
    }

    /// Recolour foreground marks after a pending or annotated change
    fn restyle(&mut self) {
        self.core_mut().restyle_by(|key| vec![key.clone()]);
    }

    /// Annotation key the annotation box is open for, if any
    fn set_pending(&mut self, key: Option<AggregationKey>) {
        self.core_mut().pending = key;
        self.restyle();
    }

    /// Record that an annotation key carries a stored annotation
    fn mark_annotated(&mut self, key: AggregationKey) {
        self.core_mut().annotated.insert(key);
        self.restyle();
    }
}

/// State every chart kind shares
pub struct ChartCore {
    pub config: ChartConfig,
    pub dimension: Dimension,
    pub filters: FilterSet,
    /// Full bucket set captured on the first render, never replaced
    pub background: Option<Vec<Bucket>>,
    /// Buckets with a non-zero count at the last render
    pub foreground: Vec<Bucket>,
    /// Buckets the background layer was last reconciled against
    pub rendered_background: Vec<Bucket>,
    pub scene: Scene,
    pub container: Vec2,
    pub pending: Option<AggregationKey>,
    pub annotated: AHashSet<AggregationKey>,
    pub render_count: usize,
}

impl ChartCore {
    pub fn new(config: ChartConfig, dimension: Dimension) -> Self {
        Self {
            config,
            dimension,
            filters: FilterSet::new(),
            background: None,
            foreground: Vec::new(),
            rendered_background: Vec::new(),
            scene: Scene::default(),
            container: Vec2::ZERO,
            pending: None,
            annotated: AHashSet::new(),
            render_count: 0,
        }
    }

    /// Group the dimension, snapshot the background on first use and
    /// return `(background, foreground)`
    pub fn pull(&mut self) -> (Vec<Bucket>, Vec<Bucket>) {
        let groups = self.dimension.group();
        let background = self.background.get_or_insert_with(|| groups.clone()).clone();
        let foreground: Vec<Bucket> = groups.into_iter().filter(|b| b.value > 0).collect();
        (background, foreground)
    }

    /// Plot area size inside the margins, never negative
    pub fn inner_size(&self) -> Vec2 {
        let m = self.config.margin;
        Vec2::new(
            (self.container.x - m.left - m.right).max(0.0),
            (self.container.y - m.top - m.bottom).max(0.0),
        )
    }

    /// Toggle the keys of one mark, update the dimension filter and build
    /// the query to broadcast.
    ///
    /// A single key toggles alone. For several keys: when any of them is
    /// selected they are all removed, otherwise they are all added.
    pub fn toggle(&mut self, mark: &AggregationKey, keys: Vec<AggregationKey>) -> ChartAction {
        let selected = match keys.as_slice() {
            [] => return ChartAction::None,
            [key] => self.filters.toggle(key),
            many => {
                if many.iter().any(|k| self.filters.contains(k)) {
                    many.iter().for_each(|k| {
                        self.filters.remove(k);
                    });
                    false
                } else {
                    many.iter().for_each(|k| {
                        self.filters.insert(k.clone());
                    });
                    true
                }
            }
        };
        self.filters.apply_to(&self.dimension);

        let descriptor = match keys.as_slice() {
            [key] => QueryDescriptor::new(self.config.index_name(), key.to_json(), QueryOperator::Equal),
            many => QueryDescriptor::new(
                self.config.index_name(),
                serde_json::Value::Array(many.iter().map(AggregationKey::to_json).collect()),
                QueryOperator::In,
            ),
        };

        tracing::debug!(
            "{} {} {} key(s); {} selected",
            self.config.panel(),
            if selected { "selected" } else { "deselected" },
            keys.len(),
            self.filters.len()
        );

        ChartAction::Toggled {
            descriptor,
            mark: mark.clone(),
            keys,
            selected,
        }
    }

    /// Foreground fill for a key: pending annotation, annotated, or plain
    pub fn fill_for(&self, key: &AggregationKey) -> Color32 {
        self.fill_for_any(std::slice::from_ref(key))
    }

    /// Fill for a mark standing for several keys; the pending colour wins
    /// over the annotated one
    pub fn fill_for_any(&self, keys: &[AggregationKey]) -> Color32 {
        let theme = self.config.theme();
        if keys.iter().any(|k| self.pending.as_ref() == Some(k)) {
            theme.selection
        } else if keys.iter().any(|k| self.annotated.contains(k)) {
            theme.annotated
        } else {
            theme.fill_color
        }
    }

    /// Recolour every foreground mark from the keys it stands for
    pub fn restyle_by<F>(&mut self, members: F)
    where
        F: Fn(&AggregationKey) -> Vec<AggregationKey>,
    {
        let fills: Vec<(AggregationKey, Color32)> = self
            .scene
            .foreground
            .keys()
            .map(|k| (k.clone(), self.fill_for_any(&members(k))))
            .collect();
        for (key, fill) in fills {
            if let Some(mark) = self.scene.foreground.get_mut(&key) {
                mark.style.fill = fill;
                mark.style.stroke = fill;
            }
        }
    }
}
