//! Screen lifecycle tracking and lifecycle-bound resource cleanup
//!
//! This module provides an explicit finite state machine mirroring the
//! creation-to-destruction transitions of a UI screen, with observer
//! registration for components that must react to transitions. The two
//! shipped observers are the [`DisposableRegistry`], which cancels
//! outstanding operations on stop/destroy, and [`AutoActivatedTask`], which
//! binds an operation factory to the started state.
//!
//! Observers may remove themselves (or others) from inside a callback;
//! dispatch works on a snapshot of the observer list.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::errors::{LifecycleError, LifecycleResult};

pub mod auto;
pub mod registry;

pub use auto::AutoActivatedTask;
pub use registry::{ClearMode, DisposableRegistry};

/// Lifecycle state of a screen
///
/// Monotonic within a run except for the Started⇄Resumed⇄Paused cycle;
/// `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Initialized,
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

impl LifecycleState {
    /// State name for error messages and logs
    pub fn name(self) -> &'static str {
        match self {
            LifecycleState::Initialized => "Initialized",
            LifecycleState::Created => "Created",
            LifecycleState::Started => "Started",
            LifecycleState::Resumed => "Resumed",
            LifecycleState::Paused => "Paused",
            LifecycleState::Stopped => "Stopped",
            LifecycleState::Destroyed => "Destroyed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lifecycle transition delivered to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// The state this event transitions into
    pub fn target(self) -> LifecycleState {
        match self {
            LifecycleEvent::Create => LifecycleState::Created,
            LifecycleEvent::Start => LifecycleState::Started,
            LifecycleEvent::Resume => LifecycleState::Resumed,
            LifecycleEvent::Pause => LifecycleState::Paused,
            LifecycleEvent::Stop => LifecycleState::Stopped,
            LifecycleEvent::Destroy => LifecycleState::Destroyed,
        }
    }
}

/// Observer of lifecycle transitions
pub trait LifecycleObserver: Send + Sync {
    /// Called after the tracker has moved to the event's target state
    fn handle_event(&self, tracker: &LifecycleTracker, event: LifecycleEvent);
}

/// Identifier of a registered observer, used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

struct TrackerInner {
    state: LifecycleState,
    observers: Vec<(ObserverId, Arc<dyn LifecycleObserver>)>,
    next_id: u64,
}

/// Finite state machine tracking one screen's lifecycle
///
/// Transition methods validate against the state machine and then notify
/// every registered observer. The `finishing` flag models a screen that is
/// going away for good, as opposed to a transient stop.
pub struct LifecycleTracker {
    inner: Mutex<TrackerInner>,
    finishing: AtomicBool,
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleTracker {
    /// Create a tracker in the `Initialized` state
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerInner {
                state: LifecycleState::Initialized,
                observers: Vec::new(),
                next_id: 0,
            }),
            finishing: AtomicBool::new(false),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.inner.lock().expect("tracker lock poisoned").state
    }

    /// Whether the screen is finishing for good rather than transiently
    /// hidden. Checked by clear-only-on-destroy registries on stop.
    pub fn is_finishing(&self) -> bool {
        self.finishing.load(Ordering::SeqCst)
    }

    /// Mark the screen as finishing. Irreversible.
    pub fn mark_finishing(&self) {
        self.finishing.store(true, Ordering::SeqCst);
    }

    /// Register an observer for subsequent transitions
    pub fn add_observer(&self, observer: Arc<dyn LifecycleObserver>) -> ObserverId {
        let mut inner = self.inner.lock().expect("tracker lock poisoned");
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, observer));
        id
    }

    /// Remove an observer. Safe to call from inside a callback; the removal
    /// takes effect for the next dispatch.
    pub fn remove_observer(&self, id: ObserverId) {
        self.inner
            .lock()
            .expect("tracker lock poisoned")
            .observers
            .retain(|(observer_id, _)| *observer_id != id);
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.lock().expect("tracker lock poisoned").observers.len()
    }

    /// Move to `Created`
    pub fn create(&self) -> LifecycleResult<()> {
        self.transition(LifecycleEvent::Create)
    }

    /// Move to `Started`, from `Created` or a transient `Stopped`
    pub fn start(&self) -> LifecycleResult<()> {
        self.transition(LifecycleEvent::Start)
    }

    /// Move to `Resumed`
    pub fn resume(&self) -> LifecycleResult<()> {
        self.transition(LifecycleEvent::Resume)
    }

    /// Move to `Paused`
    pub fn pause(&self) -> LifecycleResult<()> {
        self.transition(LifecycleEvent::Pause)
    }

    /// Move to `Stopped`
    pub fn stop(&self) -> LifecycleResult<()> {
        self.transition(LifecycleEvent::Stop)
    }

    /// Move to the terminal `Destroyed` state
    pub fn destroy(&self) -> LifecycleResult<()> {
        self.transition(LifecycleEvent::Destroy)
    }

    fn transition(&self, event: LifecycleEvent) -> LifecycleResult<()> {
        let observers = {
            let mut inner = self.inner.lock().expect("tracker lock poisoned");
            let next = next_state(inner.state, event).ok_or(LifecycleError::InvalidTransition {
                from: inner.state.name(),
                to: event.target().name(),
            })?;
            debug!(from = inner.state.name(), to = next.name(), "lifecycle transition");
            inner.state = next;
            inner.observers.clone()
        };
        // Dispatch on a snapshot so observers may self-detach.
        for (_, observer) in observers {
            observer.handle_event(self, event);
        }
        Ok(())
    }
}

impl fmt::Debug for LifecycleTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleTracker")
            .field("state", &self.state())
            .field("finishing", &self.is_finishing())
            .finish()
    }
}

fn next_state(state: LifecycleState, event: LifecycleEvent) -> Option<LifecycleState> {
    use LifecycleEvent::*;
    use LifecycleState::*;

    let next = match (state, event) {
        (Initialized, Create) => Created,
        (Created, Start) => Started,
        (Started, Resume) => Resumed,
        (Resumed, Pause) => Paused,
        (Paused, Resume) => Resumed,
        // Stopping is allowed whether or not the screen went through the
        // resume/pause cycle.
        (Started, Stop) | (Paused, Stop) => Stopped,
        (Stopped, Start) => Started,
        (Created, Destroy) | (Stopped, Destroy) => Destroyed,
        _ => return None,
    };
    Some(next)
}
