//! Tracking Context
//!
//! The tracking context records which computation is currently running.
//! This enables automatic dependency tracking: when a cell is read, it asks
//! the context for the active computation and subscribes it.
//!
//! # Implementation
//!
//! A stack of frames, pushed and popped only at the tail. Running an effect
//! pushes a [`Frame::Tracked`] frame; [`untracked`](super::untracked) pushes a
//! [`Frame::Untracked`] frame that hides any computation below it. The top
//! frame decides what [`TrackingContext::peek`] returns.
//!
//! Frames are only pushed through [`TrackingContext::enter`], which returns a
//! guard that pops when dropped. The stack is therefore restored even when the
//! computation panics, and nested effects compose: the inner effect's frame
//! sits on top of the outer one for exactly the duration of the inner run.
//!
//! Each [`Runtime`](super::Runtime) owns one context, so independent runtimes
//! never observe each other's computations.

use std::cell::RefCell;

use super::SubscriberId;

/// An entry in the tracking stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// A running computation; reads subscribe it.
    Tracked(SubscriberId),
    /// Reads performed while this frame is on top subscribe nothing.
    Untracked,
}

/// Ordered stack of running computations.
#[derive(Debug, Default)]
pub struct TrackingContext {
    stack: RefCell<Vec<Frame>>,
}

impl TrackingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame for the lifetime of the returned guard.
    pub fn enter(&self, frame: Frame) -> ContextGuard<'_> {
        self.push(frame);
        ContextGuard {
            context: self,
            frame,
        }
    }

    /// Push a frame. Prefer [`enter`](Self::enter), which guarantees the
    /// matching pop.
    pub fn push(&self, frame: Frame) {
        self.stack.borrow_mut().push(frame);
    }

    /// Pop the top frame.
    pub fn pop(&self) -> Option<Frame> {
        self.stack.borrow_mut().pop()
    }

    /// The active computation, if the top frame is a tracked one.
    pub fn peek(&self) -> Option<SubscriberId> {
        match self.stack.borrow().last() {
            Some(Frame::Tracked(id)) => Some(*id),
            _ => None,
        }
    }

    /// Check if there is an active computation.
    pub fn is_active(&self) -> bool {
        self.peek().is_some()
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Number of tracked frames, i.e. nested computation runs.
    pub fn tracked_depth(&self) -> usize {
        self.stack
            .borrow()
            .iter()
            .filter(|frame| matches!(frame, Frame::Tracked(_)))
            .count()
    }
}

/// Guard that pops its frame when dropped.
///
/// This keeps the stack consistent even if the computation panics.
pub struct ContextGuard<'a> {
    context: &'a TrackingContext,
    frame: Frame,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        let popped = self.context.pop();

        debug_assert_eq!(
            popped,
            Some(self.frame),
            "tracking frame mismatch: expected {:?}, got {:?}",
            self.frame,
            popped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn context_tracks_subscriber() {
        let context = TrackingContext::new();
        let id = SubscriberId::new();

        assert!(!context.is_active());
        assert!(context.peek().is_none());

        {
            let _frame = context.enter(Frame::Tracked(id));

            assert!(context.is_active());
            assert_eq!(context.peek(), Some(id));
        }

        // Context should be cleaned up after drop
        assert!(!context.is_active());
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn nested_contexts() {
        let context = TrackingContext::new();
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();

        {
            let _outer = context.enter(Frame::Tracked(id1));
            assert_eq!(context.peek(), Some(id1));

            {
                let _inner = context.enter(Frame::Tracked(id2));
                assert_eq!(context.peek(), Some(id2));
                assert_eq!(context.depth(), 2);
            }

            // After inner context drops, outer should be current
            assert_eq!(context.peek(), Some(id1));
        }

        assert!(context.peek().is_none());
    }

    #[test]
    fn untracked_frame_hides_computation() {
        let context = TrackingContext::new();
        let id = SubscriberId::new();

        let _outer = context.enter(Frame::Tracked(id));
        {
            let _hidden = context.enter(Frame::Untracked);
            assert!(context.peek().is_none());
            assert_eq!(context.depth(), 2);
            assert_eq!(context.tracked_depth(), 1);
        }
        assert_eq!(context.peek(), Some(id));
    }

    #[test]
    fn guard_pops_on_panic() {
        let context = TrackingContext::new();
        let id = SubscriberId::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _frame = context.enter(Frame::Tracked(id));
            panic!("effect body failed");
        }));

        assert!(result.is_err());
        assert_eq!(context.depth(), 0);
        assert!(context.peek().is_none());
    }

    #[test]
    fn manual_push_and_pop() {
        let context = TrackingContext::new();
        let id = SubscriberId::new();

        context.push(Frame::Tracked(id));
        assert_eq!(context.peek(), Some(id));
        assert_eq!(context.pop(), Some(Frame::Tracked(id)));
        assert_eq!(context.pop(), None);
    }
}
