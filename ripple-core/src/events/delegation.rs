//! Delegated dispatch of events to named actions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// An event whose target element exposes attributes.
pub trait DelegatedEvent {
    /// Value of `name` on the event's target, if present.
    fn target_attribute(&self, name: &str) -> Option<String>;
}

/// Something listeners can be attached to, such as a document root.
pub trait EventRoot<E> {
    fn listen(&self, event: &str, listener: Box<dyn Fn(&E)>);
}

/// Identifies one registered handler so it can be unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    events: RefCell<IndexSet<String>>,
    actions: RefCell<IndexMap<String, Vec<(HandlerId, Handler<E>)>>>,
    next_id: Cell<u64>,
}

/// Registry of delegated event types and named actions.
///
/// Clones share one registry.
pub struct Delegator<E> {
    registry: Rc<Registry<E>>,
}

impl<E: DelegatedEvent + 'static> Delegator<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                events: RefCell::new(IndexSet::new()),
                actions: RefCell::new(IndexMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Add event types to delegate. Duplicates are ignored.
    pub fn delegate<I, S>(&self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events = self.registry.events.borrow_mut();
        for event in types {
            events.insert(event.into());
        }
    }

    /// Delegated event types, in the order they were first added.
    pub fn events(&self) -> Vec<String> {
        self.registry.events.borrow().iter().cloned().collect()
    }

    /// Append a handler to the action `name`, creating the action if needed.
    pub fn register<F>(&self, name: &str, handler: F) -> HandlerId
    where
        F: Fn(&E) + 'static,
    {
        let id = HandlerId(self.registry.next_id.get());
        self.registry.next_id.set(id.0 + 1);

        self.registry
            .actions
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .push((id, Rc::new(handler)));
        trace!(action = name, handler = id.0, "handler registered");
        id
    }

    /// Remove one handler from an action. The action itself stays, even when
    /// it has no handlers left. Returns whether a handler was removed.
    pub fn unregister(&self, name: &str, id: HandlerId) -> bool {
        let mut actions = self.registry.actions.borrow_mut();
        let Some(handlers) = actions.get_mut(name) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        before != handlers.len()
    }

    /// Remove an action and all its handlers.
    pub fn remove(&self, name: &str) -> bool {
        self.registry.actions.borrow_mut().shift_remove(name).is_some()
    }

    /// Registered actions with their handler counts.
    pub fn list(&self) -> Vec<(String, usize)> {
        self.registry
            .actions
            .borrow()
            .iter()
            .map(|(name, handlers)| (name.clone(), handlers.len()))
            .collect()
    }

    /// Route one event of type `event_name`: read the target's
    /// `on:<event_name>` attribute and run that action's handlers in
    /// registration order. Returns the number of handlers run.
    pub fn dispatch(&self, event_name: &str, event: &E) -> usize {
        let attribute = format!("on:{event_name}");
        let Some(action) = event.target_attribute(&attribute) else {
            return 0;
        };

        // Handlers may register or unregister while we run them.
        let handlers: SmallVec<[Handler<E>; 4]> = match self.registry.actions.borrow().get(&action) {
            Some(handlers) => handlers.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => return 0,
        };

        debug!(event = event_name, %action, handlers = handlers.len(), "dispatching");
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Attach one listener per delegated event type to `root`.
    ///
    /// Event types delegated after binding are not attached.
    pub fn bind<R: EventRoot<E>>(&self, root: &R) {
        for event_name in self.events() {
            let delegator = self.clone();
            let name = event_name.clone();
            root.listen(
                &event_name,
                Box::new(move |event| {
                    delegator.dispatch(&name, event);
                }),
            );
        }
    }
}

impl<E> Clone for Delegator<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: DelegatedEvent + 'static> Default for Delegator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Delegator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegator")
            .field("events", &*self.registry.events.borrow())
            .field("actions", &self.registry.actions.borrow().len())
            .finish()
    }
}
