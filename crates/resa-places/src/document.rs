//! Page-wide pointer events.
//!
//! Every mounted field registers with the document when it mounts and is dropped from it
//! once it unmounts. A pointer-down whose target lies outside a field's element closes that
//! field's dropdown.
//!
//! Presses are delivered on the same queue as the field's own events, so a field sees
//! keystrokes and presses in the order they happened.
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use tokio::sync::mpsc;
use tracing::trace;

use crate::autocomplete::FieldEvent;

/// Identifies the element a field renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

/// A pointer press somewhere on the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerDown {
    /// The field element that was hit, if any.
    pub target: Option<ElementId>,
}

impl PointerDown {
    pub fn on(element: ElementId) -> Self {
        Self {
            target: Some(element),
        }
    }

    /// A press that hit no field at all.
    pub fn elsewhere() -> Self {
        Self { target: None }
    }

    pub fn is_inside(&self, element: ElementId) -> bool {
        self.target == Some(element)
    }
}

#[derive(Clone, Debug)]
pub struct Document {
    listeners: Arc<Mutex<Vec<mpsc::WeakUnboundedSender<FieldEvent>>>>,
    next_element: Arc<AtomicU64>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            listeners: Arc::default(),
            next_element: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn allocate(&self) -> ElementId {
        ElementId(self.next_element.fetch_add(1, Ordering::Relaxed))
    }

    /// Deliver presses to `events` until every strong sender for it is dropped.
    pub(crate) fn register(&self, events: &mpsc::UnboundedSender<FieldEvent>) {
        self.listeners().push(events.downgrade());
    }

    /// Dispatch a pointer press to every mounted field.
    pub fn pointer_down(&self, event: PointerDown) {
        let mut listeners = self.listeners();
        listeners.retain(|listener| {
            listener
                .upgrade()
                .is_some_and(|events| events.send(FieldEvent::Pointer(event)).is_ok())
        });
        if listeners.is_empty() {
            trace!("pointer event with no listeners");
        }
    }

    /// Number of fields currently listening for pointer events.
    pub fn listener_count(&self) -> usize {
        let mut listeners = self.listeners();
        listeners.retain(|listener| listener.upgrade().is_some());
        listeners.len()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<mpsc::WeakUnboundedSender<FieldEvent>>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_are_distinct() {
        let document = Document::new();
        assert_ne!(document.allocate(), document.allocate());
    }

    #[test]
    fn pointer_inside_matches_only_its_element() {
        let document = Document::new();
        let field = document.allocate();
        let other = document.allocate();

        assert!(PointerDown::on(field).is_inside(field));
        assert!(!PointerDown::on(other).is_inside(field));
        assert!(!PointerDown::elsewhere().is_inside(field));
    }

    #[test]
    fn listeners_are_released_on_drop() {
        let document = Document::new();
        let (first, _first_rx) = mpsc::unbounded_channel();
        let (second, _second_rx) = mpsc::unbounded_channel();
        document.register(&first);
        document.register(&second);
        assert_eq!(document.listener_count(), 2);

        drop(first);
        drop(second);

        assert_eq!(document.listener_count(), 0);
        document.pointer_down(PointerDown::elsewhere());
    }

    #[test]
    fn presses_queue_behind_earlier_events() {
        // Arrange
        let document = Document::new();
        let (events, mut events_rx) = mpsc::unbounded_channel();
        document.register(&events);

        // Act
        events.send(FieldEvent::Input("Marseille".to_string())).unwrap();
        document.pointer_down(PointerDown::elsewhere());
        events.send(FieldEvent::Focus).unwrap();

        // Assert
        assert!(matches!(events_rx.try_recv(), Ok(FieldEvent::Input(value)) if value == "Marseille"));
        assert!(matches!(
            events_rx.try_recv(),
            Ok(FieldEvent::Pointer(press)) if press == PointerDown::elsewhere()
        ));
        assert!(matches!(events_rx.try_recv(), Ok(FieldEvent::Focus)));
    }
}
