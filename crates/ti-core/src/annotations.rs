//! Manual annotations attached to chart marks
//!
//! Annotations are typed by the user into the inline annotation box and kept
//! in process memory only. They are keyed by panel and bucket key so a chart
//! can find the annotations of a mark when it re-renders.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::panel::PanelId;

/// Unique identifier for an annotation
pub type AnnotationId = Uuid;

/// A free-text note attached to one mark of one panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier
    pub id: AnnotationId,

    /// Panel owning the annotated mark
    pub panel: PanelId,

    /// Display form of the annotated bucket key
    pub key: String,

    /// Pointer position (page pixels) where the annotation box was opened
    pub anchor: (f32, f32),

    /// Annotation text
    pub text: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Stores annotations and indexes them by mark
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnnotationStore {
    /// All annotations in creation order
    annotations: IndexMap<AnnotationId, Annotation>,

    /// Lookup of annotations by (panel, key)
    #[serde(skip)]
    mark_index: AHashMap<(PanelId, String), Vec<AnnotationId>>,
}

impl AnnotationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store an annotation.
    ///
    /// Blank text is discarded and `None` is returned.
    pub fn add(
        &mut self,
        panel: PanelId,
        key: impl Into<String>,
        anchor: (f32, f32),
        text: impl Into<String>,
    ) -> Option<AnnotationId> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }

        let annotation = Annotation {
            id: Uuid::new_v4(),
            panel,
            key: key.into(),
            anchor,
            text,
            created_at: Utc::now(),
        };
        let id = annotation.id;

        self.mark_index
            .entry((annotation.panel, annotation.key.clone()))
            .or_default()
            .push(id);
        self.annotations.insert(id, annotation);

        tracing::info!("Stored annotation {} on {}", id, panel);
        Some(id)
    }

    /// Get an annotation by id
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// Delete an annotation
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let annotation = self.annotations.shift_remove(&id)?;
        let index_key = (annotation.panel, annotation.key.clone());
        if let Some(ids) = self.mark_index.get_mut(&index_key) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.mark_index.remove(&index_key);
            }
        }
        Some(annotation)
    }

    /// Annotations of one mark, oldest first
    pub fn for_mark(&self, panel: PanelId, key: &str) -> Vec<&Annotation> {
        self.mark_index
            .get(&(panel, key.to_string()))
            .map(|ids| ids.iter().filter_map(|id| self.annotations.get(id)).collect())
            .unwrap_or_default()
    }

    /// Whether a mark carries at least one annotation
    pub fn is_annotated(&self, panel: PanelId, key: &str) -> bool {
        self.mark_index.contains_key(&(panel, key.to_string()))
    }

    /// All annotations of a panel
    pub fn for_panel(&self, panel: PanelId) -> Vec<&Annotation> {
        self.annotations.values().filter(|a| a.panel == panel).collect()
    }

    /// Search annotations by text
    pub fn search(&self, query: &str) -> Vec<&Annotation> {
        let query_lower = query.to_lowercase();
        self.annotations
            .values()
            .filter(|a| a.text.to_lowercase().contains(&query_lower))
            .collect()
    }

    /// All annotations in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Rebuild the mark index after deserialising
    pub fn rebuild_index(&mut self) {
        self.mark_index.clear();
        for annotation in self.annotations.values() {
            self.mark_index
                .entry((annotation.panel, annotation.key.clone()))
                .or_default()
                .push(annotation.id);
        }
    }
}
