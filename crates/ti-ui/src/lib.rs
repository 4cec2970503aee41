//! egui front end for the dashboard
//!
//! Shows chart scenes through `egui_plot`, draws the hover tooltip and the
//! annotation editor, and provides the theme and widget ID helpers the
//! binary uses.

pub mod overlay_ui;
pub mod painter;
pub mod theme;
pub mod widget_utils;

pub use overlay_ui::{annotation_editor, show_tooltip, EditorAction};
pub use painter::{show_scene, PlotInteraction};
pub use theme::{apply_theme, StatusTone, UiTheme};
pub use widget_utils::panel_widget_id;

// Panel IDs
pub mod panel_ids {
    pub const STATUS: &str = "status_bar";
    pub const DASHBOARD: &str = "dashboard";
}
