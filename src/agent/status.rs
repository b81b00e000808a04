//! Status emission
//!
//! A fire-and-forget side channel surfacing lifecycle events to an
//! observer callback. Observer failures never reach the reasoning loop.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::core::StatusEvent;

/// Observer callback for lifecycle events
pub type StatusCallback = Box<dyn Fn(&StatusEvent) + Send + Sync>;

/// Best-effort notifier for lifecycle events.
///
/// Calls are synchronous, with no queuing or backpressure. A panicking
/// observer is logged and otherwise ignored.
#[derive(Default)]
pub struct StatusEmitter {
    callback: Option<StatusCallback>,
}

impl StatusEmitter {
    /// Create an emitter with no observer
    pub fn new() -> Self {
        Self { callback: None }
    }

    /// Create an emitter with an observer callback
    pub fn with_callback(callback: StatusCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Whether an observer is registered
    pub fn has_observer(&self) -> bool {
        self.callback.is_some()
    }

    /// Emit an event to the observer, if one is registered
    pub fn emit(&self, event: &StatusEvent) {
        let Some(callback) = &self.callback else {
            return;
        };

        if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
            warn!(event = event.kind(), "status observer panicked; continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn goal_start() -> StatusEvent {
        StatusEvent::GoalStart {
            goal: "g".into(),
            agent_name: "a".into(),
            available_tools: vec![],
        }
    }

    #[test]
    fn test_emit_without_observer_is_noop() {
        let emitter = StatusEmitter::new();
        emitter.emit(&goal_start());
    }

    #[test]
    fn test_observer_receives_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let emitter =
            StatusEmitter::with_callback(Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }));

        emitter.emit(&goal_start());
        emitter.emit(&goal_start());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_observer_is_swallowed() {
        let emitter = StatusEmitter::with_callback(Box::new(|_| {
            panic!("observer bug");
        }));

        emitter.emit(&goal_start());
        emitter.emit(&goal_start());
    }
}
