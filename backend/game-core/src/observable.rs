//! Current-value cells with replay to late subscribers.
//!
//! An [`Observable`] holds one value and a list of observers. Setting the value
//! notifies every observer; subscribing immediately delivers the current value.
//! Handles are cheap clones sharing the same cell, so the engine can mutate a
//! cell while display code on another task observes it.
//!
//! Every set bumps a version number and each observer remembers the newest
//! version it has seen. A delivery older than that is dropped, so a replay that
//! races a concurrent `set` never shows an observer a stale value after a newer one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type ObserverFn<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Observer<T> {
    id: u64,
    callback: ObserverFn<T>,
    delivered: Mutex<u64>,
}

impl<T> Observer<T> {
    /// Run the callback unless a newer version already reached this observer.
    ///
    /// The per-observer lock is held across the call, so deliveries to one
    /// observer never overlap.
    fn deliver(&self, version: u64, value: &T) {
        let mut delivered = relock(&self.delivered);
        if *delivered >= version {
            return;
        }
        *delivered = version;
        (self.callback)(value);
    }
}

struct Cell<T> {
    value: T,
    version: u64,
    observers: Vec<Arc<Observer<T>>>,
}

/// A value holder that replays its latest value to new observers.
pub struct Observable<T> {
    cell: Arc<Mutex<Cell<T>>>,
    next_id: Arc<AtomicU64>,
}

/// Registration handle returned by [`Observable::subscribe`].
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Cell {
                value: initial,
                version: 1,
                observers: Vec::new(),
            })),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Replace the value and notify all observers.
    ///
    /// Observers run on the calling thread, after the cell lock is released, so
    /// they may read this cell. An observer must not set the cell it observes.
    pub fn set(&self, value: T) {
        let (snapshot, version, observers) = {
            let mut cell = self.lock();
            cell.value = value;
            cell.version += 1;
            (cell.value.clone(), cell.version, cell.observers.clone())
        };

        for observer in observers {
            observer.deliver(version, &snapshot);
        }
    }

    /// Register an observer. It is called at once with the current value.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let (observer, current, version) = {
            let mut cell = self.lock();
            let observer = self.register(&mut cell, Box::new(observer), 0);
            (observer, cell.value.clone(), cell.version)
        };

        observer.deliver(version, &current);
        Subscription { id: observer.id }
    }

    /// Register an observer that only hears values set after this call.
    pub fn subscribe_changes<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut cell = self.lock();
        let seen = cell.version;
        let observer = self.register(&mut cell, Box::new(observer), seen);
        Subscription { id: observer.id }
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut cell = self.lock();
        let before = cell.observers.len();
        cell.observers.retain(|observer| observer.id != subscription.id);
        cell.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    fn register(&self, cell: &mut Cell<T>, callback: ObserverFn<T>, seen: u64) -> Arc<Observer<T>> {
        let observer = Arc::new(Observer {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            callback,
            delivered: Mutex::new(seen),
        });
        cell.observers.push(Arc::clone(&observer));
        observer
    }

    fn lock(&self) -> MutexGuard<'_, Cell<T>> {
        relock(&self.cell)
    }
}

// Observers run outside the cell lock, so poisoning only follows a panic inside
// `clone` or a callback; the guarded data is still consistent.
fn relock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T: Clone + Send + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug + Clone + Send + 'static> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = relock(&self.cell);
        f.debug_struct("Observable")
            .field("value", &cell.value)
            .field("version", &cell.version)
            .field("observers", &cell.observers.len())
            .finish()
    }
}
