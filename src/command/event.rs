//! Completion events and their dependency semantics.

use crate::error::{Error, ErrorKind, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static EVENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub u64);

/// Lifecycle state of a command.
///
/// Status only moves forward through Queued → Submitted → Running →
/// Complete. Error is terminal and reachable from any non-terminal state;
/// it short-circuits every dependent without executing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Queued,
    Submitted,
    Running,
    Complete,
    Error(ErrorKind),
}

impl EventStatus {
    fn rank(self) -> u8 {
        match self {
            EventStatus::Queued => 0,
            EventStatus::Submitted => 1,
            EventStatus::Running => 2,
            EventStatus::Complete => 3,
            EventStatus::Error(_) => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Complete | EventStatus::Error(_))
    }
}

/// Completion handle for one command node.
///
/// Shared between the issuing queue and every client holding a reference;
/// the wait list supplied at enqueue time becomes the predecessor set.
#[derive(Debug)]
pub struct Event {
    id: EventId,
    state: Mutex<EventStatus>,
    signal: Condvar,
    predecessors: Vec<Arc<Event>>,
}

impl Event {
    pub fn new(predecessors: Vec<Arc<Event>>) -> Arc<Self> {
        Arc::new(Self {
            id: EventId(EVENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            state: Mutex::new(EventStatus::Queued),
            signal: Condvar::new(),
            predecessors,
        })
    }

    /// An already-complete event, useful as a no-op dependency.
    pub fn completed() -> Arc<Self> {
        let event = Event::new(Vec::new());
        event.transition(EventStatus::Complete);
        event
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn status(&self) -> EventStatus {
        *self.state.lock()
    }

    pub fn predecessors(&self) -> &[Arc<Event>] {
        &self.predecessors
    }

    /// Advance the status. Backward transitions and transitions out of a
    /// terminal state are ignored; returns whether the update applied.
    pub fn transition(&self, status: EventStatus) -> bool {
        let mut state = self.state.lock();
        if state.is_terminal() || status.rank() <= state.rank() {
            return false;
        }
        *state = status;
        if status.is_terminal() {
            self.signal.notify_all();
        }
        true
    }

    /// Force the event into the terminal error state.
    pub fn fail(&self, kind: ErrorKind) -> bool {
        self.transition(EventStatus::Error(kind))
    }

    /// Status of the predecessor set as a whole: `Ok(true)` when every
    /// predecessor completed, `Ok(false)` while any is still pending, and
    /// the first error when one failed.
    pub fn predecessors_ready(&self) -> std::result::Result<bool, ErrorKind> {
        let mut all_complete = true;
        for pred in &self.predecessors {
            match pred.status() {
                EventStatus::Complete => {}
                EventStatus::Error(kind) => return Err(kind),
                _ => all_complete = false,
            }
        }
        Ok(all_complete)
    }

    /// Block until the event reaches a terminal state. This is the explicit
    /// wait surface; nothing inside the core calls it.
    pub fn wait(&self) -> Result<()> {
        let mut state = self.state.lock();
        while !state.is_terminal() {
            self.signal.wait(&mut state);
        }
        match *state {
            EventStatus::Complete => Ok(()),
            EventStatus::Error(kind) => Err(Error::invalid_operation(format!(
                "command failed: {kind:?}"
            ))),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let event = Event::new(Vec::new());
        assert_eq!(event.status(), EventStatus::Queued);
        assert!(event.transition(EventStatus::Submitted));
        assert!(event.transition(EventStatus::Running));
        assert!(event.transition(EventStatus::Complete));
        assert_eq!(event.status(), EventStatus::Complete);
    }

    #[test]
    fn test_no_backward_transition() {
        let event = Event::new(Vec::new());
        event.transition(EventStatus::Running);
        assert!(!event.transition(EventStatus::Submitted));
        assert_eq!(event.status(), EventStatus::Running);
    }

    #[test]
    fn test_error_is_terminal() {
        let event = Event::new(Vec::new());
        assert!(event.fail(ErrorKind::CopyOverlap));
        assert!(!event.transition(EventStatus::Running));
        assert!(!event.transition(EventStatus::Complete));
        assert_eq!(event.status(), EventStatus::Error(ErrorKind::CopyOverlap));
    }

    #[test]
    fn test_complete_refuses_error() {
        let event = Event::new(Vec::new());
        event.transition(EventStatus::Complete);
        assert!(!event.fail(ErrorKind::Io));
        assert_eq!(event.status(), EventStatus::Complete);
    }

    #[test]
    fn test_predecessor_readiness() {
        let e1 = Event::new(Vec::new());
        let e2 = Event::new(vec![Arc::clone(&e1), Event::completed()]);
        assert_eq!(e2.predecessors_ready(), Ok(false));

        e1.transition(EventStatus::Complete);
        assert_eq!(e2.predecessors_ready(), Ok(true));
    }

    #[test]
    fn test_predecessor_error_reported() {
        let e1 = Event::new(Vec::new());
        let e2 = Event::new(vec![Arc::clone(&e1)]);
        e1.fail(ErrorKind::InvalidValue);
        assert_eq!(e2.predecessors_ready(), Err(ErrorKind::InvalidValue));
    }

    #[test]
    fn test_wait_unblocks_on_completion() {
        let event = Event::new(Vec::new());
        let waiter = Arc::clone(&event);
        let handle = std::thread::spawn(move || waiter.wait());
        event.transition(EventStatus::Complete);
        assert!(handle.join().unwrap().is_ok());
    }
}
