//! Latest-value broadcast cells
//!
//! A [`StateCell`] holds an optional current value and a list of live
//! subscriber callbacks. Every push replaces the current value and fans out a
//! clone to all subscribers; a new subscriber immediately receives the latest
//! value (replay-of-one). View-models expose a fixed set of named cells which
//! screens subscribe to through their disposable registry.

use std::sync::{Arc, Mutex, Weak};

use crate::app::task::Disposable;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Subscriber<T> {
    id: u64,
    callback: Callback<T>,
}

struct CellInner<T> {
    value: Option<T>,
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
}

/// A broadcast point for one piece of screen state
///
/// Clones share the same underlying cell. Pushes fan out synchronously on the
/// pushing thread; serialization across producers is the dispatcher's job.
pub struct StateCell<T> {
    inner: Arc<Mutex<CellInner<T>>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateCell<T> {
    /// Create an empty cell. Subscribers get nothing until the first push.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CellInner {
                value: None,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Create a cell seeded with an initial value
    pub fn with_value(value: T) -> Self {
        let cell = Self::new();
        cell.inner.lock().expect("cell lock poisoned").value = Some(value);
        cell
    }
}

impl<T: Clone + Send + 'static> StateCell<T> {
    /// Replace the current value and deliver it to every live subscriber
    pub fn push(&self, value: T) {
        let callbacks: Vec<Callback<T>> = {
            let mut inner = self.inner.lock().expect("cell lock poisoned");
            inner.value = Some(value.clone());
            inner.subscribers.iter().map(|s| s.callback.clone()).collect()
        };
        // Deliver outside the lock so a callback may push or subscribe.
        for callback in callbacks {
            callback(value.clone());
        }
    }

    /// Get a clone of the latest value, if any
    pub fn latest(&self) -> Option<T> {
        self.inner.lock().expect("cell lock poisoned").value.clone()
    }

    /// Register a subscriber callback, replaying the latest value if present.
    ///
    /// Disposing the returned handle removes the subscriber; no delivery
    /// happens after removal.
    pub fn subscribe(&self, callback: impl Fn(T) + Send + Sync + 'static) -> Disposable {
        let callback: Callback<T> = Arc::new(callback);
        let (id, replay) = {
            let mut inner = self.inner.lock().expect("cell lock poisoned");
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(Subscriber {
                id,
                callback: callback.clone(),
            });
            (id, inner.value.clone())
        };
        if let Some(value) = replay {
            callback(value);
        }

        let weak: Weak<Mutex<CellInner<T>>> = Arc::downgrade(&self.inner);
        Disposable::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .lock()
                    .expect("cell lock poisoned")
                    .subscribers
                    .retain(|s| s.id != id);
            }
        })
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().expect("cell lock poisoned").subscribers.len()
    }
}
