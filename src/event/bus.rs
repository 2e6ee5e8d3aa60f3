use std::cell::RefCell;

use crate::event::{EventHandler, SessionEvent};

/// Broadcasts session events to registered handlers
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        // Handlers belong to one session; a copy starts empty
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: SessionEvent) {
        log::trace!("Emitting {event:?}");
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(&event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn closures_receive_events_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(Box::new(move |event: &SessionEvent| sink.lock().push(event.clone())));
        bus.emit(SessionEvent::RotationReset);
        bus.emit(SessionEvent::DrawSizeChanged(4.0));
        assert_eq!(
            *seen.lock(),
            vec![SessionEvent::RotationReset, SessionEvent::DrawSizeChanged(4.0)]
        );
    }

    #[test]
    fn clones_start_without_handlers() {
        let bus = EventBus::new();
        bus.subscribe(Box::new(|_: &SessionEvent| {}));
        assert_eq!(bus.clone().handler_count(), 0);
    }
}
