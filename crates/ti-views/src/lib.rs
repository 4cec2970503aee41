//! Chart widgets, layout and dashboard state
//!
//! Charts render into a retained [`Scene`] of keyed marks in plot
//! coordinates. The UI crate draws the scene with `egui_plot` and feeds
//! pointer positions back through [`Dashboard`].

pub mod chart;
pub mod dashboard;
pub mod filter;
pub mod layout;
pub mod overlay;
pub mod plots;
pub mod reconcile;
pub mod scene;

pub use chart::{ChartAction, ChartConfig, ChartConfigBuilder, ChartCore, ChartWidget, Margin};
pub use dashboard::{Dashboard, ViewError};
pub use filter::FilterSet;
pub use layout::{select_chart, GridCell, GridLayout, GridLayoutConfig};
pub use overlay::{AnnotationBox, Overlay, Tooltip, OVERLAY_OFFSET};
pub use plots::utils::Theme;
pub use plots::{BarChart, ClusterMap, LineChart, ScatterPlot};
pub use reconcile::{reconcile, Reconciliation};
pub use scene::{
    AxisLabels, Hit, HitTarget, Mark, MarkLayer, MarkStyle, PlotAxis, PlotFrame, Polyline, Scene, Shape, TextAnchor,
    TextMark,
};
