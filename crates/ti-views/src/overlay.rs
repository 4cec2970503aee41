//! Hover tooltip and inline annotation box
//!
//! The dashboard has at most one of each. Both are positioned in page pixels,
//! offset from the pointer so they do not cover the hovered mark.

use egui::{Pos2, Vec2};
use ti_core::PanelId;
use ti_data::AggregationKey;

/// Offset from the pointer to the top-left corner of an overlay
pub const OVERLAY_OFFSET: Vec2 = Vec2::new(-20.0, -40.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub panel: PanelId,
    pub key: AggregationKey,
    pub anchor: Pos2,
    pub text: String,
}

/// Text entry opened by a modifier click on a mark
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationBox {
    pub panel: PanelId,
    pub key: AggregationKey,
    /// Pointer position the box was opened at
    pub page_pos: Pos2,
    pub anchor: Pos2,
    pub draft: String,
}

impl AnnotationBox {
    /// "Add" with text to store, "Close" otherwise
    pub fn button_label(&self) -> &'static str {
        if self.draft.trim().is_empty() {
            "Close"
        } else {
            "Add"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    tooltip: Option<Tooltip>,
    annotation_box: Option<AnnotationBox>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_tooltip(&mut self, panel: PanelId, key: AggregationKey, page_pos: Pos2, text: impl Into<String>) {
        self.tooltip = Some(Tooltip {
            panel,
            key,
            anchor: page_pos + OVERLAY_OFFSET,
            text: text.into(),
        });
    }

    pub fn hide_tooltip(&mut self) -> Option<Tooltip> {
        self.tooltip.take()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Open a box for a mark, replacing and returning any previous box
    pub fn open_annotation_box(&mut self, panel: PanelId, key: AggregationKey, page_pos: Pos2) -> Option<AnnotationBox> {
        self.annotation_box.replace(AnnotationBox {
            panel,
            key,
            page_pos,
            anchor: page_pos + OVERLAY_OFFSET,
            draft: String::new(),
        })
    }

    pub fn close_annotation_box(&mut self) -> Option<AnnotationBox> {
        self.annotation_box.take()
    }

    pub fn annotation_box(&self) -> Option<&AnnotationBox> {
        self.annotation_box.as_ref()
    }

    pub fn annotation_box_mut(&mut self) -> Option<&mut AnnotationBox> {
        self.annotation_box.as_mut()
    }
}
