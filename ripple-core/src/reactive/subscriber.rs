//! Subscriber types for the reactive system.
//!
//! A subscriber is a computation (an effect) that depends on reactive cells.
//! Cells do not hold computations directly: they hold [`SubscriberId`]s, and
//! the owning [`Runtime`](super::Runtime) resolves an id to its
//! [`Computation`] when a notification fires.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// One id is allocated per `effect(...)` call and reused for every re-run of
/// that effect, so repeated reads of the same cell de-duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something a computation has subscribed to.
///
/// Implemented by reactive cells so a computation can detach itself before a
/// re-run when stale subscriptions are pruned.
pub(crate) trait Source {
    fn unsubscribe(&self, subscriber: SubscriberId);
}

/// A registered computation: the stable re-run routine behind one effect.
pub(crate) struct Computation {
    id: SubscriberId,
    run: Box<dyn Fn()>,
    /// Cells subscribed to since the last prune. Only filled under
    /// `SubscriptionPolicy::Prune`.
    sources: RefCell<Vec<Weak<dyn Source>>>,
    runs: Cell<u64>,
}

impl Computation {
    pub(crate) fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            id: SubscriberId::new(),
            run: Box::new(run),
            sources: RefCell::new(Vec::new()),
            runs: Cell::new(0),
        }
    }

    pub(crate) fn id(&self) -> SubscriberId {
        self.id
    }

    /// Number of times the body has been entered.
    pub(crate) fn runs(&self) -> u64 {
        self.runs.get()
    }

    /// Invoke the body. The caller is responsible for the tracking frame.
    pub(crate) fn invoke(&self) {
        self.runs.set(self.runs.get() + 1);
        (self.run)();
    }

    pub(crate) fn record_source(&self, source: Weak<dyn Source>) {
        self.sources.borrow_mut().push(source);
    }

    pub(crate) fn take_sources(&self) -> Vec<Weak<dyn Source>> {
        std::mem::take(&mut *self.sources.borrow_mut())
    }
}

impl fmt::Debug for Computation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computation")
            .field("id", &self.id)
            .field("runs", &self.runs.get())
            .field("sources", &self.sources.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
        assert!(id1 < id2);
    }

    #[test]
    fn computation_invoke_calls_body_and_counts() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let computation = Computation::new(move || {
            calls_clone.set(calls_clone.get() + 1);
        });

        assert_eq!(calls.get(), 0);
        computation.invoke();
        computation.invoke();
        assert_eq!(calls.get(), 2);
        assert_eq!(computation.runs(), 2);
    }

    struct Recorder(RefCell<Vec<SubscriberId>>);

    impl Source for Recorder {
        fn unsubscribe(&self, subscriber: SubscriberId) {
            self.0.borrow_mut().push(subscriber);
        }
    }

    #[test]
    fn take_sources_drains() {
        let computation = Computation::new(|| {});
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let source: Rc<dyn Source> = recorder.clone();
        computation.record_source(Rc::downgrade(&source));

        let sources = computation.take_sources();
        assert_eq!(sources.len(), 1);
        assert!(computation.take_sources().is_empty());

        for source in sources {
            source.upgrade().unwrap().unsubscribe(computation.id());
        }
        assert_eq!(*recorder.0.borrow(), vec![computation.id()]);
    }
}
