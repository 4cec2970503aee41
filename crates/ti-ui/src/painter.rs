//! Draw a chart [`Scene`] with `egui_plot`
//!
//! Bars go through a horizontal [`BarChart`], markers through [`Points`],
//! connected lines through [`Line`] and mark text through plot [`Text`]. The
//! plot owns axes, ticks and grid; a [`PlotAxis`] only decides whether an axis
//! is shown, how dense its grid is and how non-linear tick values read.

use std::hash::Hash;

use egui::{Align2, RichText, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, GridInput, Line, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text,
};
use ti_views::plots::utils::with_opacity;
use ti_views::{AxisLabels, Mark, PlotAxis, Polyline, Scene, Shape, TextAnchor, TextMark};

/// Pointer state over a chart, in plot coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlotInteraction {
    pub hovered: Option<PlotPoint>,
    pub clicked: Option<PlotPoint>,
}

/// Show a scene as a fixed, non-navigable plot and report where the pointer is
pub fn show_scene(ui: &mut Ui, id: impl Hash, scene: &Scene) -> PlotInteraction {
    let frame = scene.frame;
    let mut plot = Plot::new(id)
        .width(frame.size.x.max(1.0))
        .height(frame.size.y.max(1.0))
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .show_x(false)
        .show_y(false)
        .show_axes([scene.x_axis.is_visible(), scene.y_axis.is_visible()])
        .show_grid(scene.x_axis.is_visible() || scene.y_axis.is_visible());

    if scene.x_axis.labels != AxisLabels::Linear {
        let axis = scene.x_axis.clone();
        plot = plot.x_axis_formatter(move |value, _digits, _range| axis.label(value).unwrap_or_default());
    }
    if scene.y_axis.labels != AxisLabels::Linear {
        let axis = scene.y_axis.clone();
        plot = plot.y_axis_formatter(move |value, _digits, _range| axis.label(value).unwrap_or_default());
    }
    let x_axis = scene.x_axis.clone();
    let y_axis = scene.y_axis.clone();
    plot = plot
        .x_grid_spacer(uniform_grid_spacer(move |input| grid_steps(&x_axis, input)))
        .y_grid_spacer(uniform_grid_spacer(move |input| grid_steps(&y_axis, input)));

    let response = plot.show(ui, |plot_ui| {
        plot_ui.set_plot_bounds(PlotBounds::from_min_max(frame.min, frame.max));

        if let Some(line) = &scene.background_line {
            plot_ui.line(polyline(line));
        }
        if let Some(bars) = bar_chart(scene.background.iter()) {
            plot_ui.bar_chart(bars);
        }
        for points in scene.background.iter().filter_map(points) {
            plot_ui.points(points);
        }
        if let Some(line) = &scene.foreground_line {
            plot_ui.line(polyline(line));
        }
        if let Some(bars) = bar_chart(scene.foreground.iter()) {
            plot_ui.bar_chart(bars);
        }
        for points in scene.foreground.iter().filter_map(points) {
            plot_ui.points(points);
        }
        for text in scene
            .foreground
            .iter()
            .filter_map(|m| m.text.as_ref())
            .chain(scene.labels.values())
        {
            if let Some(text) = plot_text(text) {
                plot_ui.text(text);
            }
        }

        let pointer = plot_ui.pointer_coordinate();
        let clicked = plot_ui.response().clicked() && !plot_ui.response().dragged();
        PlotInteraction {
            hovered: pointer,
            clicked: pointer.filter(|_| clicked),
        }
    });

    response.inner
}

/// Small, medium and large grid steps for one axis.
///
/// Category axes step by one so every category gets a tick. Numeric axes
/// start from the plot's own step and coarsen by tens until at most
/// `axis.ticks` steps fit the visible range.
pub fn grid_steps(axis: &PlotAxis, input: GridInput) -> [f64; 3] {
    if let AxisLabels::Categories(_) = axis.labels {
        return [1.0, 1.0, 1.0];
    }
    let span = (input.bounds.1 - input.bounds.0).abs();
    let mut step = input.base_step_size.abs().max(f64::EPSILON);
    while axis.ticks > 0 && span / step > axis.ticks as f64 {
        step *= 10.0;
    }
    [step, step * 5.0, step * 10.0]
}

fn bar_chart<'a>(marks: impl Iterator<Item = &'a Mark>) -> Option<BarChart> {
    let bars: Vec<Bar> = marks
        .filter(|m| m.visible)
        .filter_map(|mark| match mark.shape {
            Shape::Bar { row, base, end, thickness } => Some(
                Bar::new(row, end - base)
                    .base_offset(base)
                    .width(thickness)
                    .fill(with_opacity(mark.style.fill, mark.style.fill_opacity))
                    .stroke(Stroke::new(1.0, with_opacity(mark.style.stroke, mark.style.stroke_opacity)))
                    .name(mark.key.to_string()),
            ),
            Shape::Point { .. } => None,
        })
        .collect();
    if bars.is_empty() {
        None
    } else {
        Some(BarChart::new(bars).horizontal())
    }
}

fn points(mark: &Mark) -> Option<Points> {
    match mark.shape {
        Shape::Point { at, radius } if mark.visible => Some(
            Points::new(vec![[at.x, at.y]])
                .radius(radius)
                .filled(true)
                .color(with_opacity(mark.style.fill, mark.style.fill_opacity))
                .name(mark.key.to_string()),
        ),
        _ => None,
    }
}

fn polyline(line: &Polyline) -> Line {
    let points: Vec<[f64; 2]> = line.points.iter().map(|p| [p.x, p.y]).collect();
    Line::new(PlotPoints::new(points))
        .color(with_opacity(line.color, line.opacity))
        .width(line.width)
}

fn plot_text(text: &TextMark) -> Option<Text> {
    if !text.visible || text.text.is_empty() {
        return None;
    }
    Some(
        Text::new(text.at, RichText::new(&text.text).size(text.size))
            .anchor(text_align(text.anchor))
            .color(text.color),
    )
}

pub fn text_align(anchor: TextAnchor) -> Align2 {
    match anchor {
        TextAnchor::Start => Align2::LEFT_CENTER,
        TextAnchor::Middle => Align2::CENTER_CENTER,
        TextAnchor::End => Align2::RIGHT_CENTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;
    use ti_data::Bucket;
    use ti_views::MarkStyle;

    fn input(bounds: (f64, f64), base_step_size: f64) -> GridInput {
        GridInput { bounds, base_step_size }
    }

    #[test]
    fn test_grid_steps_respect_tick_count() {
        assert_eq!(grid_steps(&PlotAxis::linear(5), input((0.0, 100.0), 1.0)), [100.0, 500.0, 1000.0]);
        assert_eq!(grid_steps(&PlotAxis::linear(200), input((0.0, 100.0), 1.0)), [1.0, 5.0, 10.0]);

        let categories = PlotAxis::categories(vec!["PDX".into(), "SEA".into()]);
        assert_eq!(grid_steps(&categories, input((-0.5, 1.5), 0.01)), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_only_visible_bars_are_drawn() {
        let style = MarkStyle::new(Color32::RED, 0.5, 0.7);
        let bar = Shape::Bar { row: 0.0, base: 0.0, end: 2.0, thickness: 0.8 };
        let mut hidden = Mark::new(&Bucket::new("PDX", 1), bar, style);
        hidden.set_visible(false);
        let shown = Mark::new(&Bucket::new("SEA", 2), bar, style);

        assert!(bar_chart([&hidden].into_iter()).is_none());
        assert!(bar_chart([&hidden, &shown].into_iter()).is_some());
        assert!(points(&shown).is_none());
    }

    #[test]
    fn test_text_align() {
        assert_eq!(text_align(TextAnchor::Start), Align2::LEFT_CENTER);
        assert_eq!(text_align(TextAnchor::End), Align2::RIGHT_CENTER);
        assert!(plot_text(&TextMark::new(PlotPoint::new(0.0, 0.0), "", TextAnchor::Start, Color32::GRAY, 10.0)).is_none());
    }
}
