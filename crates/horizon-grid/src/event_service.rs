//! Grid-wide event service.
//!
//! The [`EventService`] is the process-wide bus that grid components publish
//! to. Dispatch is synchronous: every listener registered at the time of the
//! call runs, in registration order, before `dispatch_event` returns.

use horizon_grid_core::logging::targets;
use horizon_grid_core::{ConnectionId, Signal};

use crate::events::RowSelectedEvent;
use crate::node::NodeKey;

/// Discriminant of a [`GridEvent`], used to subscribe to one kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridEventKind {
    /// A single node changed selection.
    RowSelected,
    /// A selection action finished; the tree is consistent.
    SelectionChanged,
    /// A group was opened or closed.
    RowGroupOpened,
}

/// Events published on the grid-wide bus.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A single node changed selection.
    RowSelected(RowSelectedEvent),
    /// A selection action finished.
    SelectionChanged,
    /// A group was opened or closed.
    RowGroupOpened {
        /// The group node.
        node: NodeKey,
        /// Its new expanded state.
        expanded: bool,
    },
}

impl GridEvent {
    /// The kind of this event.
    pub fn kind(&self) -> GridEventKind {
        match self {
            GridEvent::RowSelected(_) => GridEventKind::RowSelected,
            GridEvent::SelectionChanged => GridEventKind::SelectionChanged,
            GridEvent::RowGroupOpened { .. } => GridEventKind::RowGroupOpened,
        }
    }
}

/// Synchronous publish/subscribe bus for [`GridEvent`]s.
pub struct EventService {
    listeners: Signal<GridEvent>,
}

impl Default for EventService {
    fn default() -> Self {
        Self::new()
    }
}

impl EventService {
    /// Creates a service with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Signal::new(),
        }
    }

    /// Listens to events of one kind.
    pub fn add_event_listener<F>(&self, kind: GridEventKind, listener: F) -> ConnectionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.listeners.connect(move |event| {
            if event.kind() == kind {
                listener(event);
            }
        })
    }

    /// Listens to every event.
    pub fn add_global_listener<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.listeners.connect(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove_event_listener(&self, id: ConnectionId) -> bool {
        self.listeners.disconnect(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.connection_count()
    }

    /// Publishes an event to all listeners.
    pub fn dispatch_event(&self, event: GridEvent) {
        tracing::trace!(target: targets::EVENTS, kind = ?event.kind(), "dispatching grid event");
        self.listeners.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_kind_filter() {
        let service = EventService::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        service.add_event_listener(GridEventKind::SelectionChanged, move |event| {
            seen_clone.lock().push(event.kind());
        });

        service.dispatch_event(GridEvent::RowGroupOpened {
            node: NodeKey::default(),
            expanded: true,
        });
        service.dispatch_event(GridEvent::SelectionChanged);

        assert_eq!(*seen.lock(), vec![GridEventKind::SelectionChanged]);
    }

    #[test]
    fn test_registration_order_across_kinds() {
        let service = EventService::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        service.add_global_listener(move |_| first.lock().push("global"));
        let second = order.clone();
        service.add_event_listener(GridEventKind::SelectionChanged, move |_| {
            second.lock().push("kind")
        });
        let third = order.clone();
        let id = service.add_global_listener(move |_| third.lock().push("late"));

        service.dispatch_event(GridEvent::SelectionChanged);
        assert_eq!(*order.lock(), vec!["global", "kind", "late"]);

        assert!(service.remove_event_listener(id));
        assert_eq!(service.listener_count(), 2);
    }
}
