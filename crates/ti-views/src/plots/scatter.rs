//! Scatter plot over two fields, one circle per composite key

use egui::Vec2;
use egui_plot::PlotPoint;
use ti_data::{AggregationKey, Bucket, ChartKind, Dimension, Value};

use crate::chart::{ChartConfig, ChartCore, ChartWidget};
use crate::plots::utils::{extent, padded};
use crate::reconcile::reconcile;
use crate::scene::{Mark, MarkStyle, PlotAxis, PlotFrame, Shape};

/// Circle radius range in pixels
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 10.0;

/// How one part of the composite key is placed along its axis
#[derive(Debug)]
enum AxisPositions {
    /// Numeric values sit at themselves
    Numeric { range: (f64, f64) },
    /// Categories sit at integer positions in key order; `reversed` puts
    /// the first category at the far end
    Categories { names: Vec<String>, reversed: bool },
}

impl AxisPositions {
    /// Positions for part `n` of the composite keys in `buckets`
    fn build(buckets: &[Bucket], n: usize, numeric: bool, reversed: bool) -> Self {
        let parts = buckets.iter().filter_map(|b| match &b.key {
            AggregationKey::Composite(c) => c.part(n),
            _ => None,
        });

        if numeric {
            let range = padded(extent(parts.filter_map(Value::as_f64)).unwrap_or((0.0, 1.0)));
            AxisPositions::Numeric { range }
        } else {
            let mut categories: Vec<AggregationKey> = parts.map(AggregationKey::from_value).collect();
            categories.sort();
            categories.dedup();
            AxisPositions::Categories {
                names: categories.iter().map(|k| k.to_string()).collect(),
                reversed,
            }
        }
    }

    fn position(&self, value: &Value) -> Option<f64> {
        match self {
            AxisPositions::Numeric { .. } => value.as_f64(),
            AxisPositions::Categories { names, reversed } => {
                let name = AggregationKey::from_value(value).to_string();
                let index = names.iter().position(|n| *n == name)?;
                let index = if *reversed { names.len() - 1 - index } else { index };
                Some(index as f64)
            }
        }
    }

    /// Plot range covering every position
    fn range(&self) -> (f64, f64) {
        match self {
            AxisPositions::Numeric { range } => *range,
            AxisPositions::Categories { names, .. } => (-0.5, names.len().max(1) as f64 - 0.5),
        }
    }

    fn axis(&self, ticks: usize) -> PlotAxis {
        match self {
            AxisPositions::Numeric { .. } => PlotAxis::linear(ticks),
            AxisPositions::Categories { names, reversed } => {
                let mut names = names.clone();
                if *reversed {
                    names.reverse();
                }
                PlotAxis::categories(names)
            }
        }
    }
}

/// Scatter plot. The first field runs down the y axis, the second along
/// the x axis; circle area grows with the count.
pub struct ScatterPlot {
    core: ChartCore,
}

impl ScatterPlot {
    pub fn new(config: ChartConfig, dimension: Dimension) -> Self {
        Self {
            core: ChartCore::new(config, dimension),
        }
    }

    fn radius(value: u64, max: u64) -> f32 {
        if max == 0 {
            return MIN_RADIUS;
        }
        MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * ((value as f32) / (max as f32)).sqrt()
    }

    fn center(axes: &(AxisPositions, AxisPositions), key: &AggregationKey) -> Option<PlotPoint> {
        let parts = key.parts()?;
        let (y_axis, x_axis) = axes;
        let y = y_axis.position(&parts.first()?.1)?;
        let x = x_axis.position(&parts.get(1)?.1)?;
        Some(PlotPoint::new(x, y))
    }
}

impl ChartWidget for ScatterPlot {
    fn kind(&self) -> ChartKind {
        ChartKind::Scatter
    }

    fn core(&self) -> &ChartCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ChartCore {
        &mut self.core
    }

    fn render(&mut self) {
        let (background, foreground) = self.core.pull();
        let theme = *self.core.config.theme();
        let origin = PlotPoint::new(0.0, 0.0);

        // Axis categories and extents come from the background; the first
        // category of the y field sits on top
        let axes = (
            AxisPositions::build(&background, 0, self.core.config.is_numeric(0), true),
            AxisPositions::build(&background, 1, self.core.config.is_numeric(1), false),
        );
        let (y0, y1) = axes.0.range();
        let (x0, x1) = axes.1.range();
        let frame = PlotFrame::new([x0, y0], [x1, y1], self.core.inner_size());

        let bg_max = background.iter().map(|b| b.value).max().unwrap_or(0);
        let diff = reconcile(&self.core.rendered_background, &background);
        self.core.scene.background.apply(
            &diff,
            |bucket| {
                let mut mark = Mark::new(
                    bucket,
                    Shape::Point {
                        at: Self::center(&axes, &bucket.key).unwrap_or(origin),
                        radius: Self::radius(bucket.value, bg_max),
                    },
                    MarkStyle::new(theme.background_fill_color, 0.1, 0.2),
                );
                mark.visible = Self::center(&axes, &bucket.key).is_some();
                mark
            },
            |_, _| {},
        );
        self.core.rendered_background = background.clone();

        let fg_max = foreground.iter().map(|b| b.value).max().unwrap_or(0);
        let filters = self.core.filters.clone();
        let fills: ahash::AHashMap<AggregationKey, egui::Color32> =
            foreground.iter().map(|b| (b.key.clone(), self.core.fill_for(&b.key))).collect();
        let layout = |bucket: &Bucket, mark: &mut Mark| {
            let center = Self::center(&axes, &bucket.key);
            mark.shape = Shape::Point {
                at: center.unwrap_or(origin),
                radius: Self::radius(bucket.value, fg_max),
            };
            if let Some(fill) = fills.get(&bucket.key) {
                mark.style.fill = *fill;
                mark.style.stroke = *fill;
            }
            mark.set_visible(center.is_some() && filters.is_visible(&bucket.key));
        };

        let previous = std::mem::take(&mut self.core.foreground);
        self.core.scene.foreground.apply(
            &reconcile(&previous, &foreground),
            |bucket| {
                let mut mark = Mark::new(
                    bucket,
                    Shape::Point { at: origin, radius: MIN_RADIUS },
                    MarkStyle::new(theme.fill_color, 0.5, 0.7),
                );
                mark.interactive = true;
                layout(bucket, &mut mark);
                mark
            },
            |bucket, mark| layout(bucket, mark),
        );
        self.core.foreground = foreground;

        let ticks = self.core.config.ticks();
        self.core.scene.y_axis = axes.0.axis(ticks);
        self.core.scene.x_axis = axes.1.axis(ticks);
        if self.core.scene.title.is_none() {
            self.core.scene.title = Some(self.core.config.title());
        }
        self.core.scene.frame = frame;
        self.core.scene.size = self.core.container.max(Vec2::ZERO);
        self.core.render_count += 1;

        tracing::debug!(
            "{} rendered scatter plot: {} of {} keys",
            self.core.config.panel(),
            self.core.foreground.len(),
            background.len()
        );
    }
}
