//! egui visuals derived from the chart palette
//!
//! Selections, focus strokes and text in the surrounding chrome use the same
//! colours as the charts, so a selected mark and a focused widget read alike.

use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use std::collections::BTreeMap;
use ti_views::Theme as ChartTheme;

/// Status line colour for load failures
const ERROR: Color32 = Color32::from_rgb(230, 80, 80);

/// Tone of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Ready,
    Failed,
}

pub struct UiTheme {
    pub name: String,
    pub dark_mode: bool,
    /// Colours the charts draw with
    pub palette: ChartTheme,
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            name: "Dashboard Light".to_string(),
            dark_mode: false,
            palette: ChartTheme::default(),
        }
    }
}

impl UiTheme {
    /// Charts always sit on a light page; dark mode only darkens the chrome
    pub fn visuals(&self) -> Visuals {
        let palette = &self.palette;
        let mut visuals = if self.dark_mode { Visuals::dark() } else { Visuals::light() };

        let (panel_bg, text) = if self.dark_mode {
            (Color32::from_rgb(31, 31, 31), Color32::from_gray(220))
        } else {
            (Color32::WHITE, palette.text)
        };
        visuals.window_fill = panel_bg;
        visuals.panel_fill = panel_bg;
        visuals.faint_bg_color = palette.axis.linear_multiply(0.15);

        for widgets in [
            &mut visuals.widgets.noninteractive,
            &mut visuals.widgets.inactive,
            &mut visuals.widgets.hovered,
        ] {
            widgets.fg_stroke = Stroke::new(1.0, text);
            widgets.rounding = Rounding::same(2.0);
        }
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, palette.axis);
        visuals.widgets.active.bg_stroke = Stroke::new(1.0, palette.fill_color);

        visuals.selection.bg_fill = palette.fill_color.linear_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, palette.fill_color);
        visuals.hyperlink_color = palette.annotated;
        visuals.popup_shadow.extrusion = 4.0;
        visuals
    }

    pub fn status_color(&self, tone: StatusTone) -> Color32 {
        match tone {
            StatusTone::Pending => self.palette.label,
            StatusTone::Ready => self.palette.text,
            StatusTone::Failed => ERROR,
        }
    }
}

/// Apply fonts, spacing and the palette-derived visuals
pub fn apply_theme(ctx: &Context, theme: &UiTheme) {
    let mut style = Style::default();
    style.spacing.item_spacing = egui::vec2(6.0, 4.0);
    style.spacing.button_padding = egui::vec2(6.0, 3.0);

    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(10.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(12.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(12.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(16.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(11.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    ctx.set_style(style);
    ctx.set_visuals(theme.visuals());
    tracing::debug!("Applied theme '{}'", theme.name);
}
