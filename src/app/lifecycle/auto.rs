//! Start-activated operations
//!
//! An [`AutoActivatedTask`] binds a zero-argument operation factory to the
//! started state: the factory runs on every start transition and the
//! resulting handle is cancelled on every stop, until the screen is
//! destroyed. Typical use is a push-based read (the history stream) that
//! should only be live while the screen is visible.

use std::sync::{Arc, Mutex, OnceLock};

use crate::app::task::Disposable;

use super::{LifecycleEvent, LifecycleObserver, LifecycleTracker, ObserverId};

type Factory = Box<dyn Fn() -> Disposable + Send + Sync>;

/// Binds an operation factory to the start/stop transitions of a tracker
pub struct AutoActivatedTask {
    factory: Factory,
    current: Mutex<Option<Disposable>>,
    observer_id: OnceLock<ObserverId>,
}

impl AutoActivatedTask {
    /// Create the binding and attach it to the tracker as an observer
    pub fn attach(
        tracker: &Arc<LifecycleTracker>,
        factory: impl Fn() -> Disposable + Send + Sync + 'static,
    ) -> Arc<Self> {
        let task = Arc::new(Self {
            factory: Box::new(factory),
            current: Mutex::new(None),
            observer_id: OnceLock::new(),
        });
        let id = tracker.add_observer(task.clone());
        let _ = task.observer_id.set(id);
        task
    }

    /// Whether an activation is currently live
    pub fn is_active(&self) -> bool {
        self.current.lock().expect("auto task lock poisoned").is_some()
    }

    fn deactivate(&self) {
        let current = self.current.lock().expect("auto task lock poisoned").take();
        if let Some(handle) = current {
            handle.dispose();
        }
    }
}

impl LifecycleObserver for AutoActivatedTask {
    fn handle_event(&self, tracker: &LifecycleTracker, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Start => {
                let handle = (self.factory)();
                *self.current.lock().expect("auto task lock poisoned") = Some(handle);
            }
            LifecycleEvent::Stop => self.deactivate(),
            LifecycleEvent::Destroy => {
                self.deactivate();
                if let Some(id) = self.observer_id.get() {
                    tracker.remove_observer(*id);
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for AutoActivatedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoActivatedTask")
            .field("active", &self.is_active())
            .finish()
    }
}
