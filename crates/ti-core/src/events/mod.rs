//! Dashboard event bus
//!
//! The dashboard publishes a [`DashboardEvent`] when data arrives or fails to
//! arrive, when a chart is created, when a selection is broadcast and when an
//! annotation is stored. Subscribers name the [`EventKind`]s they want; the
//! desktop app drives its status line from them.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::panel::PanelId;
use crate::query::GlobalQuery;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Raw records arrived and the dashboard was populated
    DataLoaded {
        source_name: String,
        row_count: usize,
        field_count: usize,
    },
    /// Fetching or decoding the records failed
    DataLoadFailed { source_name: String, error: String },
    /// A chart widget was instantiated for a panel
    PanelCreated { panel: PanelId, chart_kind: String },
    /// A panel changed its selection and broadcast a query
    FilterChanged {
        panel: PanelId,
        query: GlobalQuery,
        /// Panels that re-rendered
        notified: usize,
        /// Records matching the broadcast query
        matching: usize,
    },
    /// An annotation was confirmed and stored
    AnnotationSaved { panel: PanelId, key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DataLoaded,
    DataLoadFailed,
    PanelCreated,
    FilterChanged,
    AnnotationSaved,
}

impl DashboardEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DashboardEvent::DataLoaded { .. } => EventKind::DataLoaded,
            DashboardEvent::DataLoadFailed { .. } => EventKind::DataLoadFailed,
            DashboardEvent::PanelCreated { .. } => EventKind::PanelCreated,
            DashboardEvent::FilterChanged { .. } => EventKind::FilterChanged,
            DashboardEvent::AnnotationSaved { .. } => EventKind::AnnotationSaved,
        }
    }
}

type Subscriber = Box<dyn FnMut(&DashboardEvent) + Send>;

/// Synchronous fan-out of dashboard events.
///
/// Clones share the subscriber list. Subscribers run on the publishing
/// thread and must not publish themselves.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<(Vec<EventKind>, Subscriber)>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `subscriber` for every published event of one of `kinds`
    pub fn subscribe<F>(&self, kinds: &[EventKind], subscriber: F)
    where
        F: FnMut(&DashboardEvent) + Send + 'static,
    {
        self.subscribers.lock().push((kinds.to_vec(), Box::new(subscriber)));
    }

    pub fn publish(&self, event: DashboardEvent) {
        let kind = event.kind();
        tracing::trace!("Publishing {:?}", kind);
        for (kinds, subscriber) in self.subscribers.lock().iter_mut() {
            if kinds.contains(&kind) {
                subscriber(&event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
