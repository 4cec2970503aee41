//! Chart implementations

// One-field charts
pub mod bar;
pub mod line;

// Two-field charts
pub mod scatter;
pub mod cluster_map;

// Utilities
pub mod utils;

// Re-exports
pub use bar::BarChart;
pub use line::LineChart;
pub use scatter::ScatterPlot;
pub use cluster_map::ClusterMap;
