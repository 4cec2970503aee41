//! Color utilities for charts

use egui::Color32;

/// Colors shared by every chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Foreground marks
    pub fill_color: Color32,
    /// Background (unfiltered) marks
    pub background_fill_color: Color32,
    /// Mark with an open annotation box
    pub selection: Color32,
    /// Mark carrying a stored annotation
    pub annotated: Color32,
    /// Value text inside marks
    pub text: Color32,
    /// Row labels
    pub label: Color32,
    /// Axis lines and grid
    pub axis: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fill_color: Color32::from_rgb(100, 150, 250),
            background_fill_color: Color32::from_rgb(120, 120, 120),
            selection: Color32::from_rgb(250, 150, 100),
            annotated: Color32::from_rgb(150, 100, 250),
            text: Color32::from_rgb(0x22, 0x22, 0x22),
            label: Color32::from_rgb(0xAA, 0xAA, 0xAA),
            axis: Color32::from_gray(160),
        }
    }
}

/// Apply an opacity in `[0, 1]` to a color
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Viridis color map
pub fn viridis_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);

    // Simplified viridis colormap
    if t < 0.25 {
        let s = t * 4.0;
        Color32::from_rgb(
            (68.0 * (1.0 - s) + 53.0 * s) as u8,
            (1.0 * (1.0 - s) + 91.0 * s) as u8,
            (84.0 * (1.0 - s) + 125.0 * s) as u8,
        )
    } else if t < 0.5 {
        let s = (t - 0.25) * 4.0;
        Color32::from_rgb(
            (53.0 * (1.0 - s) + 42.0 * s) as u8,
            (91.0 * (1.0 - s) + 117.0 * s) as u8,
            (125.0 * (1.0 - s) + 142.0 * s) as u8,
        )
    } else if t < 0.75 {
        let s = (t - 0.5) * 4.0;
        Color32::from_rgb(
            (42.0 * (1.0 - s) + 86.0 * s) as u8,
            (117.0 * (1.0 - s) + 163.0 * s) as u8,
            (142.0 * (1.0 - s) + 92.0 * s) as u8,
        )
    } else {
        let s = (t - 0.75) * 4.0;
        Color32::from_rgb(
            (86.0 * (1.0 - s) + 253.0 * s) as u8,
            (163.0 * (1.0 - s) + 231.0 * s) as u8,
            (92.0 * (1.0 - s) + 36.0 * s) as u8,
        )
    }
}
