//! Line chart of counts over one numeric field

use egui::Vec2;
use egui_plot::PlotPoint;
use ti_data::{AggregationKey, Bucket, ChartKind, Dimension};

use crate::chart::{ChartConfig, ChartCore, ChartWidget};
use crate::plots::utils::{count_position, extent, padded};
use crate::reconcile::reconcile;
use crate::scene::{Mark, MarkStyle, PlotAxis, PlotFrame, Polyline, Shape};

/// Point radius in pixels, also the hit radius
const POINT_RADIUS: f32 = 4.0;

/// Tick count of the count axis
const VALUE_TICKS: usize = 5;

pub struct LineChart {
    core: ChartCore,
}

impl LineChart {
    pub fn new(config: ChartConfig, dimension: Dimension) -> Self {
        Self {
            core: ChartCore::new(config, dimension),
        }
    }

    /// Plot position of a bucket; `None` for keys that are not numbers
    fn point(bucket: &Bucket, log: bool) -> Option<PlotPoint> {
        let key = bucket.key.as_f64()?;
        Some(PlotPoint::new(key, count_position(bucket.value, log)))
    }

    fn polyline(points: impl Iterator<Item = PlotPoint>, color: egui::Color32, opacity: f32) -> Polyline {
        Polyline {
            points: points.collect(),
            color,
            opacity,
            width: 1.5,
        }
    }
}

impl ChartWidget for LineChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Line
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
        let theme = *self.core.config.theme();
        let origin = PlotPoint::new(0.0, 0.0);

        // x over the keys of the whole population, y over the current counts
        let (x0, x1) = padded(extent(background.iter().filter_map(|b| b.key.as_f64())).unwrap_or((0.0, 1.0)));
        let (y0, y1) = padded(extent(foreground.iter().map(|b| count_position(b.value, log))).unwrap_or((0.0, 1.0)));
        let frame = PlotFrame::new([x0, y0], [x1, y1], self.core.inner_size());

        if first_render {
            let points = background.iter().filter_map(|b| Self::point(b, log));
            self.core.scene.background_line = Some(Self::polyline(points, theme.background_fill_color, 0.3));
            self.core.scene.title = Some(self.core.config.title());
        }

        let diff = reconcile(&self.core.rendered_background, &background);
        self.core.scene.background.apply(
            &diff,
            |bucket| {
                Mark::new(
                    bucket,
                    Shape::Point {
                        at: Self::point(bucket, log).unwrap_or(origin),
                        radius: POINT_RADIUS - 1.0,
                    },
                    MarkStyle::new(theme.background_fill_color, 0.2, 0.2),
                )
            },
            |_, _| {},
        );
        self.core.rendered_background = background.clone();

        let filters = self.core.filters.clone();
        let fills: Vec<(AggregationKey, egui::Color32)> =
            foreground.iter().map(|b| (b.key.clone(), self.core.fill_for(&b.key))).collect();
        let fill_of = |key: &AggregationKey| {
            fills.iter().find(|(k, _)| k == key).map(|(_, c)| *c).unwrap_or(theme.fill_color)
        };
        let layout = |bucket: &Bucket, mark: &mut Mark| {
            mark.shape = Shape::Point {
                at: Self::point(bucket, log).unwrap_or(origin),
                radius: POINT_RADIUS,
            };
            let fill = fill_of(&bucket.key);
            mark.style.fill = fill;
            mark.style.stroke = fill;
            mark.set_visible(filters.is_visible(&bucket.key) && bucket.key.as_f64().is_some());
        };

        let previous = std::mem::take(&mut self.core.foreground);
        self.core.scene.foreground.apply(
            &reconcile(&previous, &foreground),
            |bucket| {
                let mut mark = Mark::new(
                    bucket,
                    Shape::Point { at: origin, radius: POINT_RADIUS },
                    MarkStyle::new(theme.fill_color, 0.8, 1.0),
                );
                mark.interactive = true;
                layout(bucket, &mut mark);
                mark
            },
            |bucket, mark| layout(bucket, mark),
        );

        // Foreground buckets come in ascending key order
        let visible_points = foreground
            .iter()
            .filter(|b| filters.is_visible(&b.key))
            .filter_map(|b| Self::point(b, log));
        self.core.scene.foreground_line = Some(Self::polyline(visible_points, theme.fill_color, 0.8));
        self.core.foreground = foreground;

        self.core.scene.x_axis = PlotAxis::linear(self.core.config.ticks());
        self.core.scene.y_axis = if log { PlotAxis::log10(VALUE_TICKS) } else { PlotAxis::linear(VALUE_TICKS) };
        self.core.scene.frame = frame;
        self.core.scene.size = self.core.container.max(Vec2::ZERO);
        self.core.render_count += 1;

        tracing::debug!(
            "{} rendered line chart: {} points of {}",
            self.core.config.panel(),
            self.core.foreground.len(),
            background.len()
        );
    }
}
