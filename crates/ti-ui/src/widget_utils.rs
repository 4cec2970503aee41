//! Widget IDs for panels and overlays

use egui::Id;
use std::fmt::Display;
use ti_core::PanelId;

/// ID of one widget inside a panel, rooted at the panel container name so
/// panels drawing the same widgets stay apart
pub fn panel_widget_id(panel: PanelId, widget: impl Display) -> Id {
    Id::new(format!("{}_{}", panel.container_id(), widget))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_ids_differ() {
        assert_eq!(panel_widget_id(PanelId(2), "plot"), Id::new("viz2_plot"));
        assert_ne!(panel_widget_id(PanelId(0), "plot"), panel_widget_id(PanelId(1), "plot"));
        assert_ne!(panel_widget_id(PanelId(0), "tooltip"), panel_widget_id(PanelId(0), "annotation"));
    }
}
