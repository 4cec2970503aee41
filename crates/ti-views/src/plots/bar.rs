//! Horizontal bar chart over one categorical field

use ahash::AHashMap;
use egui::Vec2;
use egui_plot::PlotPoint;
use ti_data::{AggregationKey, Bucket, ChartKind, Dimension};

use crate::chart::{ChartConfig, ChartCore, ChartWidget};
use crate::plots::utils::{count_position, extent};
use crate::reconcile::reconcile;
use crate::scene::{Mark, MarkStyle, PlotAxis, PlotFrame, Shape, TextAnchor, TextMark};

/// Height of one bar row, including the gap
pub const BAR_ROW: f32 = 25.0;

/// Height of a bar
pub const BAR_HEIGHT: f32 = BAR_ROW - 5.0;

/// Labels longer than this are cut when they do not fit the margin
const LABEL_CUT: usize = 12;

const LABEL_SIZE: f32 = 11.0;
const VALUE_SIZE: f32 = 10.0;

/// Bar chart: one row per key of the full population, bar length by count.
///
/// A ghost background bar shows the unfiltered count captured on the first
/// render; the foreground bar shows the count under the other charts' filters.
/// Row `i` is centred on `y = -i` so the first key sits on top.
pub struct BarChart {
    core: ChartCore,
}

impl BarChart {
    pub fn new(config: ChartConfig, dimension: Dimension) -> Self {
        Self {
            core: ChartCore::new(config, dimension),
        }
    }

    /// Row label text, cut to 12 characters plus `...` when the key does
    /// not fit the left margin
    pub fn label_text(key: &AggregationKey, margin_left: f32) -> String {
        let text = key.to_string();
        if (text.chars().count() * 3) as f32 > margin_left {
            format!("{}...", text.chars().take(LABEL_CUT).collect::<String>())
        } else {
            text
        }
    }

    /// Right end of the value axis: the largest foreground count
    fn value_max(foreground: &[Bucket], log: bool) -> f64 {
        match extent(foreground.iter().map(|b| count_position(b.value, log))) {
            Some((_, hi)) if hi > 0.0 => hi,
            _ => 1.0,
        }
    }
}

impl ChartWidget for BarChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Bar
    }

    fn core(&self) -> &ChartCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ChartCore {
        &mut self.core
    }

    fn render(&mut self) {
        let (background, foreground) = self.core.pull();
        let first_render = self.core.render_count == 0;

        let log = self.core.config.log();
        let margin = self.core.config.margin();
        let inner = self.core.inner_size();
        let rows_shown = (background.len() as f64).max(inner.y as f64 / BAR_ROW as f64).max(1.0);

        // The left margin lives inside the plot so row labels can be drawn
        // and hit in plot space
        let max_x = Self::value_max(&foreground, log);
        let ux = max_x / inner.x.max(1.0) as f64;
        let frame = PlotFrame::new(
            [-(margin.left as f64) * ux, 0.5 - rows_shown],
            [max_x, 0.5],
            Vec2::new(inner.x + margin.left, rows_shown as f32 * BAR_ROW),
        );
        let thickness = (BAR_HEIGHT / BAR_ROW) as f64;

        // Row order follows the background, which is in ascending key order
        let rows: AHashMap<AggregationKey, usize> =
            background.iter().enumerate().map(|(i, b)| (b.key.clone(), i)).collect();
        let row_of = |key: &AggregationKey| -(rows.get(key).copied().unwrap_or(0) as f64);

        let theme = *self.core.config.theme();

        // Background bars: created once, length capped at the axis end
        let bg_changes = {
            let diff = reconcile(&self.core.rendered_background, &background);
            self.core.scene.background.apply(
                &diff,
                |bucket| {
                    Mark::new(
                        bucket,
                        Shape::Bar {
                            row: row_of(&bucket.key),
                            base: 0.0,
                            end: (count_position(bucket.value, log) + ux).min(max_x),
                            thickness,
                        },
                        MarkStyle::new(theme.background_fill_color, 0.1, 0.1),
                    )
                },
                |_, _| {},
            )
        };
        self.core.rendered_background = background.clone();

        // Foreground bars, one pixel longer than the count so zero-width
        // bars stay clickable
        let filters = self.core.filters.clone();
        let fills: AHashMap<AggregationKey, egui::Color32> =
            foreground.iter().map(|b| (b.key.clone(), self.core.fill_for(&b.key))).collect();
        let layout = |bucket: &Bucket, mark: &mut Mark| {
            let row = row_of(&bucket.key);
            mark.shape = Shape::Bar {
                row,
                base: 0.0,
                end: count_position(bucket.value, log) + ux,
                thickness,
            };
            if let Some(fill) = fills.get(&bucket.key) {
                mark.style.fill = *fill;
                mark.style.stroke = *fill;
            }
            mark.text = Some(TextMark::new(
                PlotPoint::new(5.0 * ux, row),
                bucket.value.to_string(),
                TextAnchor::Start,
                theme.text,
                VALUE_SIZE,
            ));
            mark.set_visible(filters.is_visible(&bucket.key));
        };

        let previous = std::mem::take(&mut self.core.foreground);
        let fg_changes = self.core.scene.foreground.apply(
            &reconcile(&previous, &foreground),
            |bucket| {
                let mut mark = Mark::new(
                    bucket,
                    Shape::Bar {
                        row: 0.0,
                        base: 0.0,
                        end: 0.0,
                        thickness,
                    },
                    MarkStyle::new(theme.fill_color, 0.5, 0.7),
                );
                mark.interactive = true;
                layout(bucket, &mut mark);
                mark
            },
            |bucket, mark| layout(bucket, mark),
        );
        self.core.foreground = foreground;

        // Row labels for every background row; created once, kept five
        // pixels left of the axis on every render
        if first_render {
            self.core.scene.labels = background
                .iter()
                .map(|b| {
                    let label = TextMark::new(
                        PlotPoint::new(0.0, row_of(&b.key)),
                        Self::label_text(&b.key, margin.left),
                        TextAnchor::End,
                        theme.label,
                        LABEL_SIZE,
                    );
                    (b.key.clone(), label)
                })
                .collect();
            self.core.scene.title = Some(self.core.config.title());
        }
        for label in self.core.scene.labels.values_mut() {
            label.at.x = -5.0 * ux;
        }

        let ticks = self.core.config.ticks();
        self.core.scene.x_axis = if log { PlotAxis::log10(ticks) } else { PlotAxis::linear(ticks) };
        self.core.scene.y_axis = PlotAxis::hidden();
        self.core.scene.frame = frame;
        self.core.scene.size = Vec2::new(
            inner.x + margin.left + margin.right,
            rows_shown as f32 * BAR_ROW + margin.top + margin.bottom,
        );
        self.core.render_count += 1;

        tracing::debug!(
            "{} rendered bar chart: {} rows, foreground +{} ~{} -{}, background +{}",
            self.core.config.panel(),
            background.len(),
            fg_changes.entered,
            fg_changes.updated,
            fg_changes.exited,
            bg_changes.entered
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartAction;
    use crate::scene::AxisLabels;
    use egui::Modifiers;
    use ti_core::PanelId;
    use ti_data::{AggregationIndex, DimensionKey, Record, Value};

    fn flights() -> AggregationIndex {
        AggregationIndex::new(vec![
            Record::from_pairs([("origin", Value::from("SEA")), ("dep_delay", Value::from(5.0))]),
            Record::from_pairs([("origin", Value::from("SEA")), ("dep_delay", Value::from(10.0))]),
            Record::from_pairs([("origin", Value::from("PDX")), ("dep_delay", Value::from(3.0))]),
        ])
    }

    fn origin_chart(index: &AggregationIndex) -> BarChart {
        let dimension = index.dimension(DimensionKey::Single("origin".into()));
        let config = ChartConfig::builder(PanelId(1), ["origin"])
            .margin_left(100.0)
            .ticks(5)
            .label("#Flights")
            .build();
        let mut chart = BarChart::new(config, dimension);
        chart.resize(Vec2::new(300.0, 200.0));
        chart.render();
        chart
    }

    fn bar_center(chart: &BarChart, key: &str) -> PlotPoint {
        chart
            .scene()
            .foreground
            .get(&AggregationKey::from(key))
            .map(|m| m.shape.center())
            .unwrap()
    }

    #[test]
    fn test_two_bars_for_two_keys() {
        let index = flights();
        let chart = origin_chart(&index);
        let frame = chart.scene().frame;

        assert_eq!(chart.scene().foreground.len(), 2);
        assert_eq!(chart.background().unwrap(), &[Bucket::new("PDX", 1), Bucket::new("SEA", 2)]);

        let sea = chart.scene().foreground.get(&AggregationKey::from("SEA")).unwrap();
        assert_eq!(sea.text.as_ref().map(|t| t.text.as_str()), Some("2"));
        let pdx = chart.scene().foreground.get(&AggregationKey::from("PDX")).unwrap();
        assert!(pdx.shape.screen_bounds(&frame).width() < sea.shape.screen_bounds(&frame).width());
        assert!((sea.shape.screen_bounds(&frame).height() - BAR_HEIGHT).abs() < 0.01);

        // PDX sorts first, so it sits on the top row
        assert!(pdx.shape.center().y > sea.shape.center().y);
        assert_eq!(chart.scene().title.as_deref(), Some("#Flights origin"));
        assert_eq!(chart.scene().x_axis.labels, AxisLabels::Linear);
        assert!(!chart.scene().y_axis.is_visible());
    }

    #[test]
    fn test_filtered_bars_are_hidden_not_removed() {
        let index = flights();
        let mut chart = origin_chart(&index);

        let action = chart.click(bar_center(&chart, "SEA"), Modifiers::NONE);
        assert!(matches!(action, ChartAction::Toggled { selected: true, .. }));
        chart.render();

        let scene = chart.scene();
        assert_eq!(scene.foreground.len(), 2);
        for mark in scene.foreground.iter() {
            let expected = mark.key == AggregationKey::from("SEA");
            assert_eq!(mark.visible, expected);
            assert_eq!(mark.text.as_ref().map(|t| t.visible), Some(expected));
        }
    }

    #[test]
    fn test_toggle_twice_restores_aggregation() {
        let index = flights();
        let mut chart = origin_chart(&index);
        let delay = index.dimension(DimensionKey::Single("dep_delay".into()));
        let before = delay.group();

        let point = bar_center(&chart, "PDX");
        chart.click(point, Modifiers::NONE);
        chart.render();
        assert_ne!(delay.group(), before);

        chart.click(point, Modifiers::NONE);
        chart.render();
        assert!(chart.filters().is_empty());
        assert_eq!(delay.group(), before);
        assert!(chart.scene().foreground.iter().all(|m| m.visible));
    }

    #[test]
    fn test_background_is_invariant_after_first_render() {
        let index = flights();
        let mut chart = origin_chart(&index);
        let delay = index.dimension(DimensionKey::Single("dep_delay".into()));
        let snapshot = chart.background().map(<[Bucket]>::to_vec);
        let first_bg = chart.scene().background.clone();

        delay.filter_exact(&AggregationKey::from(3.0));
        chart.render();

        assert_eq!(chart.background().map(<[Bucket]>::to_vec), snapshot);
        assert_eq!(chart.scene().background, first_bg);
        // SEA has no record with a delay of 3 and leaves the foreground
        assert!(!chart.scene().foreground.contains(&AggregationKey::from("SEA")));
    }

    #[test]
    fn test_alt_click_requests_annotation() {
        let index = flights();
        let mut chart = origin_chart(&index);
        let alt = Modifiers { alt: true, ..Modifiers::NONE };

        let action = chart.click(bar_center(&chart, "SEA"), alt);
        assert_eq!(action, ChartAction::Annotate { key: AggregationKey::from("SEA") });
        assert!(chart.filters().is_empty());

        chart.set_pending(Some(AggregationKey::from("SEA")));
        let theme = *chart.config().theme();
        let fill = chart.scene().foreground.get(&AggregationKey::from("SEA")).map(|m| m.style.fill);
        assert_eq!(fill, Some(theme.selection));

        chart.set_pending(None);
        let fill = chart.scene().foreground.get(&AggregationKey::from("SEA")).map(|m| m.style.fill);
        assert_eq!(fill, Some(theme.fill_color));
    }

    #[test]
    fn test_label_click_toggles() {
        let index = flights();
        let mut chart = origin_chart(&index);
        let frame = chart.scene().frame;
        let label = frame.to_screen(chart.scene().labels[&AggregationKey::from("SEA")].at);
        let point = frame.from_screen(label - Vec2::new(2.0, 0.0));
        assert!(matches!(chart.click(point, Modifiers::NONE), ChartAction::Toggled { .. }));
        assert!(chart.filters().contains(&AggregationKey::from("SEA")));
    }

    #[test]
    fn test_log_axis_places_counts_by_magnitude() {
        let records = (0..100)
            .map(|_| Record::from_pairs([("origin", Value::from("SEA"))]))
            .chain(std::iter::once(Record::from_pairs([("origin", Value::from("PDX"))])))
            .collect();
        let index = AggregationIndex::new(records);
        let dimension = index.dimension(DimensionKey::Single("origin".into()));
        let config = ChartConfig::builder(PanelId(1), ["origin"]).log(true).build();
        let mut chart = BarChart::new(config, dimension);
        chart.resize(Vec2::new(220.0, 100.0));
        chart.render();

        let scene = chart.scene();
        assert_eq!(scene.frame.max[0], 2.0);
        assert_eq!(scene.x_axis.labels, AxisLabels::Log10);
        assert_eq!(scene.x_axis.label(2.0).as_deref(), Some("100"));
        // A single record still gets a one pixel bar
        let pdx = scene.foreground.get(&AggregationKey::from("PDX")).unwrap();
        assert!((pdx.shape.screen_bounds(&scene.frame).width() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_data_and_zero_container() {
        let index = AggregationIndex::new(Vec::new());
        let dimension = index.dimension(DimensionKey::Single("origin".into()));
        let mut chart = BarChart::new(ChartConfig::builder(PanelId(0), ["origin"]).build(), dimension);
        chart.render();

        assert!(chart.scene().foreground.is_empty());
        assert!(chart.scene().x_axis.is_visible());
        assert!(chart.scene().title.is_some());
        assert!(chart.scene().size.x >= 0.0);
        assert!(chart.scene().frame.max[1] > chart.scene().frame.min[1]);
    }

    #[test]
    fn test_label_truncation() {
        let long = AggregationKey::from("Seattle-Tacoma International");
        assert_eq!(BarChart::label_text(&long, 30.0), "Seattle-Taco...");
        assert_eq!(BarChart::label_text(&long, 100.0), "Seattle-Tacoma International");
        assert_eq!(BarChart::label_text(&AggregationKey::from("SEA"), 100.0), "SEA");
    }
}
