//! Reactive Cell
//!
//! The storage unit shared by [`Signal`](super::Signal) and the state
//! handles: a value plus the ids of the computations that read it.
//!
//! # Memory Layout
//!
//! Each cell consists of:
//! - A unique ID (8 bytes)
//! - The value, behind a `RefCell`
//! - An insertion-ordered subscriber set (grows with number of dependents)
//! - A weak handle to the owning runtime

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::config::SubscriptionPolicy;
use super::equality::{equal, Equal};
use super::runtime::{Runtime, RuntimeInner};
use super::subscriber::{Source, SubscriberId};

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Inline capacity of the subscriber snapshot taken before notifying.
type Snapshot = SmallVec<[SubscriberId; 8]>;

pub(crate) struct ReactiveCell<T> {
    id: u64,
    value: RefCell<T>,
    subscribers: RefCell<IndexSet<SubscriberId>>,
    runtime: Weak<RuntimeInner>,
}

impl<T> ReactiveCell<T>
where
    T: Clone + Equal + 'static,
{
    pub(crate) fn new(runtime: &Runtime, value: T) -> Rc<Self> {
        Rc::new(Self {
            id: next_cell_id(),
            value: RefCell::new(value),
            subscribers: RefCell::new(IndexSet::new()),
            runtime: runtime.downgrade(),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Subscribe the active computation, if any.
    pub(crate) fn track(self: &Rc<Self>) {
        let Some(runtime) = self.runtime.upgrade() else {
            return;
        };
        let Some(subscriber) = runtime.context.peek() else {
            return;
        };

        if !self.subscribers.borrow_mut().insert(subscriber) {
            return;
        }
        trace!(cell = self.id, %subscriber, "subscribed");

        if runtime.config.subscriptions == SubscriptionPolicy::Prune {
            if let Some(computation) = runtime.computation(subscriber) {
                let source: Rc<dyn Source> = self.clone();
                computation.record_source(Rc::downgrade(&source));
            }
        }
    }

    /// Tracked read through a borrow of the value.
    pub(crate) fn read<R>(self: &Rc<Self>, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.value.borrow())
    }

    pub(crate) fn read_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Equality-gated write. Returns the value the cell holds afterwards
    /// (before any subscriber ran).
    pub(crate) fn write(&self, next: T) -> T {
        {
            let current = self.value.borrow();
            if equal(&*current, &next) {
                return current.clone();
            }
        }

        let written = next.clone();
        *self.value.borrow_mut() = next;
        self.notify();
        written
    }

    /// Resolve `f(&current)` and write the result.
    pub(crate) fn update(&self, f: impl FnOnce(&T) -> T) -> T {
        // Clone so `f` may read this cell again.
        let current = self.value.borrow().clone();
        self.write(f(&current))
    }

    /// Re-run every subscriber, in subscription order.
    ///
    /// The set is copied first: subscriptions made during this pass wait for
    /// the next write, and subscribers may be removed while we iterate.
    fn notify(&self) {
        let snapshot: Snapshot = self.subscribers.borrow().iter().copied().collect();
        if snapshot.is_empty() {
            return;
        }
        let Some(runtime) = self.runtime.upgrade() else {
            return;
        };

        debug!(cell = self.id, subscribers = snapshot.len(), "value changed, notifying");
        for subscriber in snapshot {
            runtime.rerun(subscriber);
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    #[cfg(test)]
    pub(crate) fn has_subscriber(&self, subscriber: SubscriberId) -> bool {
        self.subscribers.borrow().contains(&subscriber)
    }
}

impl<T> Source for ReactiveCell<T> {
    fn unsubscribe(&self, subscriber: SubscriberId) {
        // shift_remove keeps the remaining subscribers in order
        if self.subscribers.borrow_mut().shift_remove(&subscriber) {
            trace!(cell = self.id, %subscriber, "unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::context::Frame;

    #[test]
    fn read_outside_computation_subscribes_nothing() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, 1);

        assert_eq!(cell.read(|v| *v), 1);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn read_inside_frame_subscribes_once() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, 1);
        let id = SubscriberId::new();

        {
            let _frame = runtime.inner().context.enter(Frame::Tracked(id));
            cell.read(|_| ());
            cell.read(|_| ());
        }

        assert_eq!(cell.subscriber_count(), 1);
        assert!(cell.has_subscriber(id));
    }

    #[test]
    fn untracked_frame_does_not_subscribe() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, 1);

        let _outer = runtime.inner().context.enter(Frame::Tracked(SubscriberId::new()));
        let _hidden = runtime.inner().context.enter(Frame::Untracked);
        cell.read(|_| ());

        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn equal_write_is_a_no_op() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, vec![1, 2]);

        assert_eq!(cell.write(vec![1, 2]), vec![1, 2]);
        assert_eq!(cell.write(vec![3]), vec![3]);
        assert_eq!(cell.read_untracked(Vec::len), 1);
    }

    #[test]
    fn update_sees_previous_value() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, 10);

        assert_eq!(cell.update(|v| v + 5), 15);
        assert_eq!(cell.read_untracked(|v| *v), 15);
    }

    #[test]
    fn unsubscribe_preserves_order() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, 0);
        let ids: Vec<_> = (0..3).map(|_| SubscriberId::new()).collect();

        for id in &ids {
            let _frame = runtime.inner().context.enter(Frame::Tracked(*id));
            cell.read(|_| ());
        }
        cell.unsubscribe(ids[1]);

        let remaining: Vec<_> = cell.subscribers.borrow().iter().copied().collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn cell_outlives_runtime() {
        let runtime = Runtime::new();
        let cell = ReactiveCell::new(&runtime, 0);
        drop(runtime);

        assert_eq!(cell.write(4), 4);
        assert_eq!(cell.read(|v| *v), 4);
    }
}
