//! Pending dependency tracking.
//!
//! A record that belongs to an association on a not-yet-saved record must
//! wait for that record before it can commit. The tracker keeps the set of
//! identities still being waited on and observes each dependency's
//! [`LoadSignal`]. Observation is never a blocking wait: a one-shot
//! observer pushes the identity into the owning manager's inbox, and the
//! manager turns it into a `doneWaitingOn` event.

use crate::core::ObjectId;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::trace;

type LoadObserver = Box<dyn FnOnce(ObjectId) + Send>;

struct SignalInner {
    loaded: bool,
    observers: Vec<LoadObserver>,
}

/// Observable "loaded" condition of one record.
///
/// Clones share the same condition. Observers fire at most once, when the
/// condition turns true (or immediately if it already is), and are dropped
/// after firing.
///
/// # Example
///
/// ```rust
/// use record_state::core::ObjectId;
/// use record_state::manager::LoadSignal;
/// use std::sync::{Arc, Mutex};
///
/// let signal = LoadSignal::new(ObjectId::new());
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// signal.observe(Box::new(move |id: ObjectId| sink.lock().unwrap().push(id)));
/// assert!(seen.lock().unwrap().is_empty());
///
/// signal.set_loaded(true);
/// assert_eq!(seen.lock().unwrap().as_slice(), &[signal.id()]);
/// assert_eq!(signal.observer_count(), 0);
/// ```
#[derive(Clone)]
pub struct LoadSignal {
    id: ObjectId,
    inner: Arc<Mutex<SignalInner>>,
}

impl LoadSignal {
    /// A signal for `id` that is not loaded yet.
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            inner: Arc::new(Mutex::new(SignalInner {
                loaded: false,
                observers: Vec::new(),
            })),
        }
    }

    /// A signal for `id` that is already loaded.
    pub fn loaded(id: ObjectId) -> Self {
        let signal = Self::new(id);
        signal.set_loaded(true);
        signal
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, SignalInner> {
        // Observers run outside the lock, so a poisoned lock still holds
        // consistent data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    /// Update the condition. Turning it true fires and drops every
    /// registered observer.
    pub fn set_loaded(&self, loaded: bool) {
        let fired = {
            let mut inner = self.lock();
            let became_loaded = loaded && !inner.loaded;
            inner.loaded = loaded;
            if became_loaded {
                std::mem::take(&mut inner.observers)
            } else {
                Vec::new()
            }
        };
        for observer in fired {
            observer(self.id);
        }
    }

    /// Register a one-shot observer.
    pub fn observe(&self, observer: LoadObserver) {
        let mut inner = self.lock();
        if inner.loaded {
            drop(inner);
            observer(self.id);
        } else {
            inner.observers.push(observer);
        }
    }

    /// Observers still waiting for the condition.
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }
}

impl fmt::Debug for LoadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("LoadSignal")
            .field("id", &self.id)
            .field("loaded", &inner.loaded)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

/// The set of dependencies a record is waiting on.
#[derive(Debug)]
pub struct PendingTracker {
    waiting: BTreeSet<ObjectId>,
    notifier: UnboundedSender<ObjectId>,
}

impl PendingTracker {
    /// Create a tracker and the inbox its observers deliver into.
    pub(crate) fn channel() -> (Self, UnboundedReceiver<ObjectId>) {
        let (notifier, inbox) = unbounded_channel();
        let tracker = Self {
            waiting: BTreeSet::new(),
            notifier,
        };
        (tracker, inbox)
    }

    /// Start waiting on `dependency`.
    ///
    /// Waiting on an identity that is already pending registers no second
    /// observer.
    pub fn waiting_on(&mut self, dependency: &LoadSignal) {
        if !self.waiting.insert(dependency.id()) {
            trace!(dependency = %dependency.id(), "already waiting on dependency");
            return;
        }
        self.observe(dependency);
    }

    pub(crate) fn observe(&self, dependency: &LoadSignal) {
        let notifier = self.notifier.clone();
        dependency.observe(Box::new(move |id: ObjectId| {
            // The manager is gone; nobody is left to notify.
            let _ = notifier.send(id);
        }));
    }

    /// Stop waiting on `id`. Returns `true` when nothing is pending anymore.
    pub fn done_waiting_on(&mut self, id: ObjectId) -> bool {
        self.waiting.remove(&id);
        self.waiting.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.waiting.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.waiting.iter().copied()
    }

    /// Forget every pending identity. Observers already registered still
    /// deliver into the inbox; those deliveries find nothing to resolve.
    pub(crate) fn clear(&mut self) {
        self.waiting.clear();
    }

    pub(crate) fn restore(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.waiting.extend(ids);
    }
}
