//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read within an effect, the signal registers that
//!    effect as a subscriber.
//!
//! 2. When a write changes the signal's value (by [`Equal`]), all
//!    subscribers re-run, in the order they subscribed, before the write
//!    returns.
//!
//! 3. A write of an equal value does nothing.
//!
//! Reading and writing are separate methods. There is no value-based
//! read/write discrimination: writing `0`, `false` or `None` is an ordinary
//! write.

use std::fmt::{self, Debug};
use std::rc::Rc;

use super::cell::ReactiveCell;
use super::equality::Equal;
use super::runtime::Runtime;

/// A reactive signal holding a value of type T.
///
/// Cloning a signal yields another handle to the same cell.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::signal;
///
/// let count = signal(0);
///
/// // Read the value
/// assert_eq!(count.get(), 0);
///
/// // Update the value (notifies subscribers)
/// assert_eq!(count.set(5), 5);
/// assert_eq!(count.update(|n| n + 1), 6);
/// ```
pub struct Signal<T> {
    cell: Rc<ReactiveCell<T>>,
}

impl<T> Signal<T>
where
    T: Clone + Equal + 'static,
{
    /// Create a new signal owned by `runtime`.
    pub fn new(runtime: &Runtime, value: T) -> Self {
        Self {
            cell: ReactiveCell::new(runtime, value),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.cell.id()
    }

    /// Get the current value.
    ///
    /// If called within an effect, this also registers the effect as a
    /// subscriber.
    pub fn get(&self) -> T {
        self.cell.read(T::clone)
    }

    /// Tracked read through a reference, without cloning.
    ///
    /// `f` must not write this signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.read(f)
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.cell.read_untracked(T::clone)
    }

    /// Set a new value and notify subscribers if it differs from the current
    /// one.
    ///
    /// Returns the value the signal holds after the write: `value`, or the
    /// unchanged current value when the write was a no-op.
    pub fn set(&self, value: T) -> T {
        self.cell.write(value)
    }

    /// Set the value computed from the previous one.
    ///
    /// `f` receives a copy of the current value, so it may read this signal.
    /// The previous value is read untracked: calling `update` inside an effect
    /// does not subscribe the effect to this signal.
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&T) -> T,
    {
        self.cell.update(f)
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.cell.subscriber_count()
    }

    /// True if both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Signal<T>) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Equal + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cell.read_untracked(|value| {
            f.debug_struct("Signal")
                .field("id", &self.id())
                .field("value", value)
                .field("subscriber_count", &self.subscriber_count())
                .finish()
        })
    }
}

impl Runtime {
    /// Create a signal in this runtime.
    pub fn signal<T>(&self, initial: T) -> Signal<T>
    where
        T: Clone + Equal + 'static,
    {
        Signal::new(self, initial)
    }
}

/// Create a signal in the current thread's runtime.
pub fn signal<T>(initial: T) -> Signal<T>
where
    T: Clone + Equal + 'static,
{
    Signal::new(&Runtime::current(), initial)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
