//! Core functionality for the linked-chart dashboard
//!
//! This crate provides the process-wide abstractions shared by every chart:
//! panel identity, cross-chart query propagation, the event bus and the
//! in-memory annotation store.

pub mod annotations;
pub mod events;
pub mod panel;
pub mod query;

// Re-export commonly used types
pub use annotations::{Annotation, AnnotationId, AnnotationStore};
pub use events::{DashboardEvent, EventBus, EventKind};
pub use panel::PanelId;
pub use query::{GlobalQuery, QueryDescriptor, QueryError, QueryManager, QueryOperator};
