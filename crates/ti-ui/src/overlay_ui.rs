//! Tooltip and annotation editor windows

use egui::{Area, Context, Frame, Key, Order, TextEdit};
use ti_views::{AnnotationBox, Tooltip};

use crate::widget_utils::panel_widget_id;

/// What the user did with the annotation editor this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    /// The button was pressed; blank text stores nothing
    Confirm,
    /// Escape was pressed
    Cancel,
}

/// Draw the hover tooltip. Empty text draws nothing.
pub fn show_tooltip(ctx: &Context, tooltip: &Tooltip) {
    if tooltip.text.trim().is_empty() {
        return;
    }
    Area::new(panel_widget_id(tooltip.panel, "tooltip"))
        .order(Order::Tooltip)
        .fixed_pos(tooltip.anchor)
        .interactable(false)
        .show(ctx, |ui| {
            Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(tooltip.text.as_str());
            });
        });
}

/// Draw the annotation box and edit its draft in place
pub fn annotation_editor(ctx: &Context, annotation_box: &mut AnnotationBox) -> EditorAction {
    let mut action = EditorAction::None;

    Area::new(panel_widget_id(annotation_box.panel, "annotation"))
        .order(Order::Foreground)
        .fixed_pos(annotation_box.anchor)
        .show(ctx, |ui| {
            Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let edit = ui.add(
                        TextEdit::singleline(&mut annotation_box.draft)
                            .hint_text(annotation_box.key.to_string())
                            .desired_width(160.0),
                    );
                    edit.request_focus();

                    let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                    if ui.button(annotation_box.button_label()).clicked() || submitted {
                        action = EditorAction::Confirm;
                    }
                });
            });
        });

    if action == EditorAction::None && ctx.input(|i| i.key_pressed(Key::Escape)) {
        action = EditorAction::Cancel;
    }
    action
}
