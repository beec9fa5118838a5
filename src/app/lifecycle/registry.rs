//! Lifecycle-scoped registry of cancelable operations
//!
//! A [`DisposableRegistry`] owns the handles of every outstanding operation a
//! screen has started, and cancels them on the lifecycle transition its mode
//! selects. After the destroy transition the registry detaches itself from
//! the tracker and rejects further registrations.

use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use crate::app::task::Disposable;
use crate::errors::{LifecycleError, LifecycleResult};

use super::{LifecycleEvent, LifecycleObserver, LifecycleState, LifecycleTracker, ObserverId};

/// When the registry cancels its handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    /// Clear on every stop transition. The default for operations whose
    /// results only matter while the screen is visible.
    OnStop,
    /// Clear only when the screen is actually finishing. Survives transient
    /// stops such as navigating away and back.
    OnDestroy,
}

/// Registry of outstanding operation handles for one screen
pub struct DisposableRegistry {
    tracker: Arc<LifecycleTracker>,
    mode: ClearMode,
    handles: Mutex<Vec<Disposable>>,
    observer_id: OnceLock<ObserverId>,
}

impl DisposableRegistry {
    /// Create a registry and attach it to the tracker as an observer
    pub fn attach(tracker: Arc<LifecycleTracker>, mode: ClearMode) -> Arc<Self> {
        let registry = Arc::new(Self {
            tracker: tracker.clone(),
            mode,
            handles: Mutex::new(Vec::new()),
            observer_id: OnceLock::new(),
        });
        let id = tracker.add_observer(registry.clone());
        // attach() is the only writer.
        let _ = registry.observer_id.set(id);
        registry
    }

    /// Take ownership of an operation handle.
    ///
    /// Rejected once the owning screen is destroyed: a handle added then
    /// would never be cleaned up. The state check happens under the handles
    /// lock, so a destroy racing with an add either rejects the handle or
    /// drains it in the destroy-time clear.
    pub fn add(&self, handle: Disposable) -> LifecycleResult<()> {
        let mut held = self.handles.lock().expect("registry lock poisoned");
        let state = self.tracker.state();
        if state >= LifecycleState::Destroyed {
            return Err(LifecycleError::RegistryUnavailable {
                state: state.name(),
            });
        }
        held.push(handle);
        Ok(())
    }

    /// Number of handles currently held
    pub fn len(&self) -> usize {
        self.handles.lock().expect("registry lock poisoned").len()
    }

    /// Whether the registry holds no handles
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancel and drop every held handle
    pub fn clear(&self) {
        let handles: Vec<Disposable> = {
            let mut held = self.handles.lock().expect("registry lock poisoned");
            held.drain(..).collect()
        };
        if !handles.is_empty() {
            debug!(count = handles.len(), "clearing operation handles");
        }
        // Dispose outside the lock: teardowns may add to other registries.
        for handle in handles {
            handle.dispose();
        }
    }
}

impl LifecycleObserver for DisposableRegistry {
    fn handle_event(&self, tracker: &LifecycleTracker, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Stop => {
                if self.mode == ClearMode::OnStop || tracker.is_finishing() {
                    self.clear();
                }
            }
            LifecycleEvent::Destroy => {
                self.clear();
                if let Some(id) = self.observer_id.get() {
                    tracker.remove_observer(*id);
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for DisposableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposableRegistry")
            .field("mode", &self.mode)
            .field("handles", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_disposable(counter: &Arc<AtomicUsize>) -> Disposable {
        let counter = counter.clone();
        Disposable::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_always_clear_on_stop() {
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnStop);
        let disposed = Arc::new(AtomicUsize::new(0));

        tracker.create().unwrap();
        tracker.start().unwrap();
        registry.add(counting_disposable(&disposed)).unwrap();
        registry.add(counting_disposable(&disposed)).unwrap();
        assert_eq!(registry.len(), 2);

        tracker.stop().unwrap();
        assert!(registry.is_empty());
        assert_eq!(disposed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_on_destroy_survives_transient_stop() {
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
        let disposed = Arc::new(AtomicUsize::new(0));

        tracker.create().unwrap();
        tracker.start().unwrap();
        registry.add(counting_disposable(&disposed)).unwrap();

        // Transient stop: screen-off or navigating away and back.
        tracker.stop().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(disposed.load(Ordering::SeqCst), 0);

        tracker.start().unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_on_destroy_clears_when_finishing() {
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
        let disposed = Arc::new(AtomicUsize::new(0));

        tracker.create().unwrap();
        tracker.start().unwrap();
        registry.add(counting_disposable(&disposed)).unwrap();

        tracker.mark_finishing();
        tracker.stop().unwrap();

        assert!(registry.is_empty());
        assert_eq!(disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_destroy_clears_and_detaches() {
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
        let disposed = Arc::new(AtomicUsize::new(0));

        tracker.create().unwrap();
        tracker.start().unwrap();
        registry.add(counting_disposable(&disposed)).unwrap();

        tracker.stop().unwrap();
        tracker.destroy().unwrap();

        assert!(registry.is_empty());
        assert_eq!(disposed.load(Ordering::SeqCst), 1);
        // Self-detached: no observers left on the tracker.
        assert_eq!(tracker.observer_count(), 0);
    }

    #[test]
    fn test_add_rejected_after_destroy() {
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnStop);

        tracker.create().unwrap();
        tracker.destroy().unwrap();

        let result = registry.add(Disposable::empty());
        assert!(matches!(
            result,
            Err(LifecycleError::RegistryUnavailable { state: "Destroyed" })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_allowed_before_create() {
        // Initialized is at the start of the lifecycle; registration is
        // legal as soon as the tracker exists.
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker, ClearMode::OnStop);
        assert!(registry.add(Disposable::empty()).is_ok());
    }

    #[test]
    fn test_concurrent_adds_racing_destroy_leave_no_live_handles() {
        let tracker = Arc::new(LifecycleTracker::new());
        let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
        let disposed = Arc::new(AtomicUsize::new(0));

        tracker.create().unwrap();

        let accepted = Arc::new(AtomicUsize::new(0));
        let mut threads = Vec::new();
        for _ in 0..4 {
            let registry = registry.clone();
            let disposed = disposed.clone();
            let accepted = accepted.clone();
            threads.push(std::thread::spawn(move || {
                // Keep adding until the destroyed tracker rejects us.
                while registry.add(counting_disposable(&disposed)).is_ok() {
                    accepted.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        std::thread::sleep(std::time::Duration::from_millis(10));
        tracker.destroy().unwrap();
        for thread in threads {
            thread.join().unwrap();
        }

        // Every accepted handle was disposed by the destroy-time clear;
        // nothing slipped in behind it.
        assert!(registry.is_empty());
        assert_eq!(
            disposed.load(Ordering::SeqCst),
            accepted.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn test_two_registries_do_not_interfere() {
        let tracker = Arc::new(LifecycleTracker::new());
        let on_stop = DisposableRegistry::attach(tracker.clone(), ClearMode::OnStop);
        let on_destroy = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
        let disposed = Arc::new(AtomicUsize::new(0));

        tracker.create().unwrap();
        tracker.start().unwrap();
        on_stop.add(counting_disposable(&disposed)).unwrap();
        on_destroy.add(counting_disposable(&disposed)).unwrap();

        tracker.stop().unwrap();
        assert!(on_stop.is_empty());
        assert_eq!(on_destroy.len(), 1);
        assert_eq!(disposed.load(Ordering::SeqCst), 1);
    }
}
