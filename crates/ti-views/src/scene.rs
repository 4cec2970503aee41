//! Retained chart scene
//!
//! A chart renders into a [`Scene`]: keyed marks in a background and a
//! foreground layer, row labels, polylines, axis descriptions and a title.
//! Geometry is kept in plot coordinates; the [`PlotFrame`] says which plot
//! rectangle is visible and at what pixel size, so pointer positions can be
//! resolved against the marks with [`Scene::hit_test`]. The UI crate hands
//! the scene to `egui_plot` for drawing.

use egui::{Color32, Pos2, Rect, Vec2};
use egui_plot::PlotPoint;
use indexmap::IndexMap;
use ti_data::{AggregationKey, Bucket};

use crate::reconcile::Reconciliation;

/// Approximate glyph width relative to the font size, for label hit boxes
const GLYPH_WIDTH: f32 = 0.6;

/// Visible plot bounds and the pixel size they are drawn at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub min: [f64; 2],
    pub max: [f64; 2],
    pub size: Vec2,
}

impl Default for PlotFrame {
    fn default() -> Self {
        Self {
            min: [0.0, 0.0],
            max: [1.0, 1.0],
            size: Vec2::ZERO,
        }
    }
}

impl PlotFrame {
    /// Frame over `[min, max]`. Empty or inverted ranges are widened to one unit.
    pub fn new(min: [f64; 2], max: [f64; 2], size: Vec2) -> Self {
        let widen = |lo: f64, hi: f64| if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
        let (x0, x1) = widen(min[0], max[0]);
        let (y0, y1) = widen(min[1], max[1]);
        Self {
            min: [x0, y0],
            max: [x1, y1],
            size: size.max(Vec2::ZERO),
        }
    }

    /// Plot units covered by one pixel along x and y
    pub fn units_per_pixel(&self) -> [f64; 2] {
        [
            (self.max[0] - self.min[0]) / self.size.x.max(1.0) as f64,
            (self.max[1] - self.min[1]) / self.size.y.max(1.0) as f64,
        ]
    }

    /// Frame-local pixel position of a plot point, y growing downwards
    pub fn to_screen(&self, point: PlotPoint) -> Pos2 {
        let [ux, uy] = self.units_per_pixel();
        Pos2::new(((point.x - self.min[0]) / ux) as f32, ((self.max[1] - point.y) / uy) as f32)
    }

    pub fn from_screen(&self, pos: Pos2) -> PlotPoint {
        let [ux, uy] = self.units_per_pixel();
        PlotPoint::new(self.min[0] + pos.x as f64 * ux, self.max[1] - pos.y as f64 * uy)
    }
}

/// Geometry of a mark in plot coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Horizontal bar from `base` to `end` along x, centred on `row`
    Bar { row: f64, base: f64, end: f64, thickness: f64 },
    /// Round marker; the radius is in pixels
    Point { at: PlotPoint, radius: f32 },
}

impl Shape {
    pub fn center(&self) -> PlotPoint {
        match self {
            Shape::Bar { row, base, end, .. } => PlotPoint::new((base + end) / 2.0, *row),
            Shape::Point { at, .. } => *at,
        }
    }

    /// Pixel rectangle covered inside `frame`
    pub fn screen_bounds(&self, frame: &PlotFrame) -> Rect {
        match *self {
            Shape::Bar { row, base, end, thickness } => Rect::from_two_pos(
                frame.to_screen(PlotPoint::new(base, row + thickness / 2.0)),
                frame.to_screen(PlotPoint::new(end, row - thickness / 2.0)),
            ),
            Shape::Point { at, radius } => Rect::from_center_size(frame.to_screen(at), Vec2::splat(radius * 2.0)),
        }
    }

    pub fn contains(&self, frame: &PlotFrame, point: PlotPoint) -> bool {
        match *self {
            Shape::Bar { .. } => self.screen_bounds(frame).contains(frame.to_screen(point)),
            Shape::Point { at, radius } => frame.to_screen(at).distance(frame.to_screen(point)) <= radius,
        }
    }
}

/// Fill and stroke of a mark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStyle {
    pub fill: Color32,
    pub fill_opacity: f32,
    pub stroke: Color32,
    pub stroke_opacity: f32,
}

impl MarkStyle {
    pub fn new(color: Color32, fill_opacity: f32, stroke_opacity: f32) -> Self {
        Self {
            fill: color,
            fill_opacity,
            stroke: color,
            stroke_opacity,
        }
    }
}

/// Horizontal text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Text anchored at a plot point, vertically centred on it
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    pub at: PlotPoint,
    pub text: String,
    pub anchor: TextAnchor,
    pub color: Color32,
    pub size: f32,
    pub visible: bool,
}

impl TextMark {
    pub fn new(at: PlotPoint, text: impl Into<String>, anchor: TextAnchor, color: Color32, size: f32) -> Self {
        Self {
            at,
            text: text.into(),
            anchor,
            color,
            size,
            visible: true,
        }
    }

    /// Estimated pixel box inside `frame`
    pub fn bounds(&self, frame: &PlotFrame) -> Rect {
        let pos = frame.to_screen(self.at);
        let width = self.text.chars().count() as f32 * self.size * GLYPH_WIDTH;
        let left = match self.anchor {
            TextAnchor::Start => pos.x,
            TextAnchor::Middle => pos.x - width / 2.0,
            TextAnchor::End => pos.x - width,
        };
        Rect::from_min_size(Pos2::new(left, pos.y - self.size / 2.0), Vec2::new(width, self.size))
    }
}

/// One keyed visual element
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub key: AggregationKey,
    pub value: u64,
    pub shape: Shape,
    pub style: MarkStyle,
    /// Hidden marks stay in the scene but are not painted or hit
    pub visible: bool,
    pub interactive: bool,
    /// Text drawn with the mark, such as the count of a bar
    pub text: Option<TextMark>,
}

impl Mark {
    pub fn new(bucket: &Bucket, shape: Shape, style: MarkStyle) -> Self {
        Self {
            key: bucket.key.clone(),
            value: bucket.value,
            shape,
            style,
            visible: true,
            interactive: false,
            text: None,
        }
    }

    /// Show or hide the mark together with its text
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let Some(text) = &mut self.text {
            text.visible = visible;
        }
    }
}

/// Counts of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerChanges {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// Marks keyed by aggregation key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkLayer {
    marks: IndexMap<AggregationKey, Mark>,
}

impl MarkLayer {
    /// Apply a reconciliation: exited marks are removed, updated marks are
    /// laid out again in place, entered marks are created.
    pub fn apply<E, U>(&mut self, reconciliation: &Reconciliation, mut enter: E, mut update: U) -> LayerChanges
    where
        E: FnMut(&Bucket) -> Mark,
        U: FnMut(&Bucket, &mut Mark),
    {
        for key in &reconciliation.exited {
            self.marks.shift_remove(key);
        }
        for bucket in &reconciliation.updated {
            if let Some(mark) = self.marks.get_mut(&bucket.key) {
                mark.value = bucket.value;
                update(bucket, mark);
            }
        }
        for bucket in &reconciliation.entered {
            self.marks.insert(bucket.key.clone(), enter(bucket));
        }

        LayerChanges {
            entered: reconciliation.entered.len(),
            updated: reconciliation.updated.len(),
            exited: reconciliation.exited.len(),
        }
    }

    pub fn get(&self, key: &AggregationKey) -> Option<&Mark> {
        self.marks.get(key)
    }

    pub fn get_mut(&mut self, key: &AggregationKey) -> Option<&mut Mark> {
        self.marks.get_mut(key)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Mark> {
        self.marks.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mark> {
        self.marks.values_mut()
    }

    /// Marks currently shown
    pub fn visible(&self) -> impl Iterator<Item = &Mark> {
        self.marks.values().filter(|m| m.visible)
    }

    pub fn contains(&self, key: &AggregationKey) -> bool {
        self.marks.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &AggregationKey> {
        self.marks.keys()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// How the plot labels the ticks of one axis
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AxisLabels {
    #[default]
    Hidden,
    /// Plain numbers, formatted by the plot
    Linear,
    /// Positions are log10 of the data value
    Log10,
    /// Integer position `i` names the i-th category
    Categories(Vec<String>),
}

/// Description of one plot axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotAxis {
    pub labels: AxisLabels,
    /// Roughly how many ticks to show
    pub ticks: usize,
}

impl PlotAxis {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn linear(ticks: usize) -> Self {
        Self {
            labels: AxisLabels::Linear,
            ticks,
        }
    }

    pub fn log10(ticks: usize) -> Self {
        Self {
            labels: AxisLabels::Log10,
            ticks,
        }
    }

    pub fn categories(names: Vec<String>) -> Self {
        Self {
            ticks: names.len(),
            labels: AxisLabels::Categories(names),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.labels != AxisLabels::Hidden
    }

    /// Tick label at a plot position, `None` when the plot's own number
    /// formatting applies
    pub fn label(&self, position: f64) -> Option<String> {
        match &self.labels {
            AxisLabels::Hidden => Some(String::new()),
            AxisLabels::Linear => None,
            AxisLabels::Log10 => {
                let value = 10f64.powf(position);
                Some(if value >= 1.0 {
                    format!("{:.0}", value)
                } else {
                    format!("{:.2}", value)
                })
            }
            AxisLabels::Categories(names) => {
                let index = position.round();
                if (position - index).abs() > 1e-6 || index < 0.0 {
                    return Some(String::new());
                }
                Some(names.get(index as usize).cloned().unwrap_or_default())
            }
        }
    }
}

/// Connected line through points
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<PlotPoint>,
    pub color: Color32,
    pub opacity: f32,
    pub width: f32,
}

/// What a pointer position resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Mark,
    Label,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub key: AggregationKey,
    pub target: HitTarget,
}

/// Everything a chart draws
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Content size in pixels, margins included
    pub size: Vec2,
    pub frame: PlotFrame,
    pub background: MarkLayer,
    pub foreground: MarkLayer,
    pub labels: IndexMap<AggregationKey, TextMark>,
    pub x_axis: PlotAxis,
    pub y_axis: PlotAxis,
    pub background_line: Option<Polyline>,
    pub foreground_line: Option<Polyline>,
    pub title: Option<String>,
}

impl Scene {
    /// Topmost visible interactive mark or row label at a plot point
    pub fn hit_test(&self, point: PlotPoint) -> Option<Hit> {
        if let Some(mark) = self.mark_at(point) {
            return Some(Hit {
                key: mark.key.clone(),
                target: HitTarget::Mark,
            });
        }

        let pos = self.frame.to_screen(point);
        self.labels
            .iter()
            .find(|(_, label)| label.visible && label.bounds(&self.frame).contains(pos))
            .map(|(key, _)| Hit {
                key: key.clone(),
                target: HitTarget::Label,
            })
    }

    /// Visible interactive mark at a plot point, ignoring labels
    pub fn mark_at(&self, point: PlotPoint) -> Option<&Mark> {
        self.foreground
            .iter()
            .rev()
            .find(|m| m.visible && m.interactive && m.shape.contains(&self.frame, point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;

    fn frame() -> PlotFrame {
        PlotFrame::new([0.0, -2.0], [100.0, 2.0], Vec2::new(200.0, 40.0))
    }

    fn bar(bucket: &Bucket) -> Mark {
        let mut mark = Mark::new(
            bucket,
            Shape::Bar {
                row: 0.0,
                base: 0.0,
                end: bucket.value as f64,
                thickness: 0.8,
            },
            MarkStyle::new(Color32::RED, 0.5, 0.7),
        );
        mark.interactive = true;
        mark
    }

    #[test]
    fn test_frame_maps_both_ways() {
        let frame = frame();
        assert_eq!(frame.to_screen(PlotPoint::new(50.0, 0.0)), Pos2::new(100.0, 20.0));
        assert_eq!(frame.to_screen(PlotPoint::new(0.0, 2.0)), Pos2::ZERO);
        assert_eq!(frame.from_screen(Pos2::new(200.0, 40.0)), PlotPoint::new(100.0, -2.0));

        let flat = PlotFrame::new([3.0, 1.0], [3.0, 1.0], Vec2::ZERO);
        assert_eq!(flat.min, [2.5, 0.5]);
        assert_eq!(flat.max, [3.5, 1.5]);
    }

    #[test]
    fn test_layer_apply_keeps_identity() {
        let mut layer = MarkLayer::default();
        let first = vec![Bucket::new("PDX", 1), Bucket::new("SEA", 2)];
        let changes = layer.apply(&reconcile(&[], &first), bar, |_, _| {});
        assert_eq!(changes, LayerChanges { entered: 2, updated: 0, exited: 0 });

        let second = vec![Bucket::new("SEA", 5), Bucket::new("LAX", 1)];
        let changes = layer.apply(&reconcile(&first, &second), bar, |b, m| *m = bar(b));
        assert_eq!(changes, LayerChanges { entered: 1, updated: 1, exited: 1 });
        assert!(!layer.contains(&AggregationKey::from("PDX")));
        assert_eq!(layer.get(&AggregationKey::from("SEA")).map(|m| m.value), Some(5));
        assert_eq!(layer.keys().next(), Some(&AggregationKey::from("SEA")));
    }

    #[test]
    fn test_hit_test_skips_hidden_marks() {
        let mut scene = Scene {
            frame: frame(),
            ..Scene::default()
        };
        scene.foreground.apply(&reconcile(&[], &[Bucket::new("SEA", 20)]), bar, |_, _| {});

        let inside = PlotPoint::new(10.0, 0.1);
        assert_eq!(scene.hit_test(inside).map(|h| h.target), Some(HitTarget::Mark));
        assert!(scene.hit_test(PlotPoint::new(30.0, 0.0)).is_none());

        if let Some(mark) = scene.foreground.get_mut(&AggregationKey::from("SEA")) {
            mark.set_visible(false);
        }
        assert!(scene.hit_test(inside).is_none());
    }

    #[test]
    fn test_point_radius_is_in_pixels() {
        let point = Shape::Point {
            at: PlotPoint::new(50.0, 0.0),
            radius: 4.0,
        };
        // One pixel is half a unit along x
        assert!(point.contains(&frame(), PlotPoint::new(51.5, 0.0)));
        assert!(!point.contains(&frame(), PlotPoint::new(53.0, 0.0)));
    }

    #[test]
    fn test_label_bounds() {
        let label = TextMark::new(PlotPoint::new(50.0, 0.0), "SEA", TextAnchor::End, Color32::GRAY, 10.0);
        assert!(label.bounds(&frame()).contains(Pos2::new(95.0, 20.0)));
        assert!(!label.bounds(&frame()).contains(Pos2::new(105.0, 20.0)));
    }

    #[test]
    fn test_axis_labels() {
        let origins = PlotAxis::categories(vec!["PDX".into(), "SEA".into()]);
        assert_eq!(origins.label(1.0).as_deref(), Some("SEA"));
        assert_eq!(origins.label(0.5).as_deref(), Some(""));
        assert_eq!(origins.label(4.0).as_deref(), Some(""));

        assert_eq!(PlotAxis::log10(5).label(2.0).as_deref(), Some("100"));
        assert_eq!(PlotAxis::linear(5).label(2.0), None);
        assert!(!PlotAxis::hidden().is_visible());
    }
}
