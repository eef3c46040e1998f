//! State Handles
//!
//! `state(initial)` picks a handle shape from the kind of the initial value:
//!
//! - A record (a [`Value::Object`] or a [`Record`]) or an array becomes a
//!   [`ReactiveObject`]: one independent cell per property (per index, for
//!   arrays) present at creation. Reading a property subscribes to that
//!   property only, so an effect reading `a` is not re-run by a write to `b`.
//! - Anything else becomes a [`ScalarState`], a single cell behind a
//!   `value()` / `set_value()` pair that also coerces to strings
//!   ([`Display`](fmt::Display)) and numbers ([`ScalarState::value_of`]).
//!
//! The property table of a [`ReactiveObject`] is fixed at creation.
//! Properties written later are stored, but reads and writes of them are not
//! tracked.
//!
//! `null` stays scalar.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use super::equality::Equal;
use super::runtime::Runtime;
use super::signal::Signal;
use crate::value::{Record, ToNumber, Value};

// ----------------------------------------------------------------------------
// Scalar state
// ----------------------------------------------------------------------------

/// A single reactive value exposed through a `value` accessor pair.
pub struct ScalarState<T> {
    signal: Signal<T>,
}

impl<T> ScalarState<T>
where
    T: Clone + Equal + 'static,
{
    pub fn new(runtime: &Runtime, value: T) -> Self {
        Self {
            signal: runtime.signal(value),
        }
    }

    /// Tracked read.
    pub fn value(&self) -> T {
        self.signal.get()
    }

    /// Equality-gated write; returns the value held afterwards.
    pub fn set_value(&self, value: T) -> T {
        self.signal.set(value)
    }

    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&T) -> T,
    {
        self.signal.update(f)
    }

    pub fn value_untracked(&self) -> T {
        self.signal.get_untracked()
    }

    /// Numeric coercion of the live value (tracked).
    pub fn value_of(&self) -> f64
    where
        T: ToNumber,
    {
        self.signal.with(ToNumber::to_number)
    }

    /// The underlying cell.
    pub fn signal(&self) -> &Signal<T> {
        &self.signal
    }
}

impl<T> Clone for ScalarState<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

/// String coercion. Reads the live value and subscribes like `value()`.
impl<T> fmt::Display for ScalarState<T>
where
    T: Clone + Equal + fmt::Display + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.signal.with(|value| fmt::Display::fmt(value, f))
    }
}

impl<T> fmt::Debug for ScalarState<T>
where
    T: Clone + Equal + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScalarState").field(&self.signal).finish()
    }
}

/// Compare the live value (tracked).
impl<T> PartialEq<T> for ScalarState<T>
where
    T: Clone + Equal + PartialEq + 'static,
{
    fn eq(&self, other: &T) -> bool {
        self.signal.with(|value| value == other)
    }
}

// ----------------------------------------------------------------------------
// Composite state
// ----------------------------------------------------------------------------

/// Whether a composite was built from a record or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Record,
    /// Properties are the indices `"0"`, `"1"`, ...
    Array,
}

/// A record or array whose properties are individually reactive.
///
/// Clones share the same property table, so every holder observes the same
/// object.
///
/// ```
/// use ripple_core::reactive::Runtime;
/// use ripple_core::Value;
///
/// let runtime = Runtime::new();
/// let user = runtime.object(Value::from_json(r#"{"name": "ada", "age": 36}"#)?);
///
/// assert_eq!(user.get("name"), Some(Value::from("ada")));
/// user.set("age", 37);
/// assert_eq!(user.get("age"), Some(Value::from(37)));
/// # Ok::<(), ripple_core::ReactiveError>(())
/// ```
#[derive(Clone)]
pub struct ReactiveObject {
    inner: Rc<ObjectInner>,
}

struct ObjectInner {
    shape: Shape,
    fields: IndexMap<String, Signal<Value>>,
    /// Properties added after creation; not reactive.
    extra: RefCell<Record>,
}

impl ReactiveObject {
    /// Build the property table from a record.
    pub fn new(runtime: &Runtime, record: Record) -> Self {
        Self::with_shape(runtime, Shape::Record, record)
    }

    /// Build the property table from array items, one property per index.
    pub fn from_array(runtime: &Runtime, items: Vec<Value>) -> Self {
        let record = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect();
        Self::with_shape(runtime, Shape::Array, record)
    }

    fn with_shape(runtime: &Runtime, shape: Shape, record: Record) -> Self {
        let fields = record
            .into_iter()
            .map(|(key, value)| (key, runtime.signal(value)))
            .collect();

        Self {
            inner: Rc::new(ObjectInner {
                shape,
                fields,
                extra: RefCell::new(Record::new()),
            }),
        }
    }

    pub fn shape(&self) -> Shape {
        self.inner.shape
    }

    pub fn is_array(&self) -> bool {
        self.inner.shape == Shape::Array
    }

    /// Read a property. Reactive properties subscribe the active computation
    /// to that property alone.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.inner.fields.get(key) {
            Some(field) => Some(field.get()),
            None => self.inner.extra.borrow().get(key).cloned(),
        }
    }

    /// Read an array element; same as `get(&index.to_string())`.
    pub fn at(&self, index: usize) -> Option<Value> {
        self.get(&index.to_string())
    }

    /// Write a property and return the value it holds afterwards.
    ///
    /// A reactive property notifies only its own subscribers, and only when
    /// the value changes. A property that did not exist at creation is stored
    /// without notifying anyone.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Value {
        let value = value.into();
        match self.inner.fields.get(key) {
            Some(field) => field.set(value),
            None => {
                debug!(key, "storing non-reactive property");
                self.inner
                    .extra
                    .borrow_mut()
                    .insert(key.to_owned(), value.clone());
                value
            }
        }
    }

    /// Update a property from its previous value (`Undefined` if absent).
    pub fn update<F>(&self, key: &str, f: F) -> Value
    where
        F: FnOnce(&Value) -> Value,
    {
        match self.inner.fields.get(key) {
            Some(field) => field.update(f),
            None => {
                let previous = self.get(key).unwrap_or_default();
                self.set(key, f(&previous))
            }
        }
    }

    /// The cell behind a reactive property.
    pub fn field(&self, key: &str) -> Option<&Signal<Value>> {
        self.inner.fields.get(key)
    }

    /// True if `key` was present at creation.
    pub fn is_reactive(&self, key: &str) -> bool {
        self.inner.fields.contains_key(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.is_reactive(key) || self.inner.extra.borrow().contains_key(key)
    }

    /// Property names: creation-time properties first, then later additions.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .fields
            .keys()
            .cloned()
            .chain(self.inner.extra.borrow().keys().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.len() + self.inner.extra.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Untracked snapshot as a plain value of the original shape.
    ///
    /// For arrays, later properties whose keys are indices extend the array,
    /// leaving `Undefined` holes; other later properties are dropped.
    pub fn to_value(&self) -> Value {
        self.snapshot(Signal::<Value>::get_untracked)
    }

    fn snapshot(&self, read: impl Fn(&Signal<Value>) -> Value) -> Value {
        let extra = self.inner.extra.borrow();
        match self.inner.shape {
            Shape::Record => {
                let mut record: Record = self
                    .inner
                    .fields
                    .iter()
                    .map(|(key, field)| (key.clone(), read(field)))
                    .collect();
                record.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(record)
            }
            Shape::Array => {
                let mut items: Vec<Value> = self.inner.fields.values().map(read).collect();
                for (key, value) in extra.iter() {
                    let Some(index) = array_index(key) else {
                        continue;
                    };
                    if index >= items.len() {
                        items.resize(index + 1, Value::Undefined);
                    }
                    items[index] = value.clone();
                }
                Value::Array(items)
            }
        }
    }

    /// True if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// `"7"` is an index, `"07"` and `"-1"` are not.
fn array_index(key: &str) -> Option<usize> {
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

/// String coercion: `[object Object]` for records, the comma-joined
/// elements for arrays. Array elements are read like `get`, so an effect
/// that formats an array subscribes to every element.
impl fmt::Display for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.shape {
            Shape::Record => f.write_str("[object Object]"),
            Shape::Array => fmt::Display::fmt(&self.snapshot(Signal::<Value>::get), f),
        }
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("shape", &self.inner.shape)
            .field("reactive", &self.inner.fields.keys().collect::<Vec<_>>())
            .field("value", &self.to_value())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Dispatch
// ----------------------------------------------------------------------------

/// State handle for a dynamic [`Value`], shaped by the value's kind.
#[derive(Clone, Debug)]
pub enum State {
    Scalar(ScalarState<Value>),
    Object(ReactiveObject),
}

impl State {
    pub fn is_object(&self) -> bool {
        matches!(self, State::Object(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarState<Value>> {
        match self {
            State::Scalar(scalar) => Some(scalar),
            State::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            State::Object(object) => Some(object),
            State::Scalar(_) => None,
        }
    }
}

/// Values that can seed a state handle.
///
/// Integers are covered by `i32` only and floats by `f64` only, so a bare
/// literal such as `state(0)` resolves. Other scalar types go through
/// [`scalar`] or [`Runtime::scalar`].
pub trait IntoState {
    /// The handle produced for this kind of value.
    type State;

    fn into_state(self, runtime: &Runtime) -> Self::State;
}

impl IntoState for Value {
    type State = State;

    fn into_state(self, runtime: &Runtime) -> State {
        match self {
            Value::Object(record) => State::Object(ReactiveObject::new(runtime, record)),
            Value::Array(items) => State::Object(ReactiveObject::from_array(runtime, items)),
            scalar => State::Scalar(ScalarState::new(runtime, scalar)),
        }
    }
}

impl IntoState for Record {
    type State = ReactiveObject;

    fn into_state(self, runtime: &Runtime) -> ReactiveObject {
        ReactiveObject::new(runtime, self)
    }
}

macro_rules! impl_scalar_state {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoState for $t {
                type State = ScalarState<$t>;

                fn into_state(self, runtime: &Runtime) -> ScalarState<$t> {
                    ScalarState::new(runtime, self)
                }
            }
        )*
    };
}

impl_scalar_state!((), bool, char, String, &'static str, i32, f64);

impl<T: Clone + Equal + 'static> IntoState for Vec<T> {
    type State = ScalarState<Vec<T>>;

    fn into_state(self, runtime: &Runtime) -> Self::State {
        ScalarState::new(runtime, self)
    }
}

impl<T: Clone + Equal + 'static> IntoState for Option<T> {
    type State = ScalarState<Option<T>>;

    fn into_state(self, runtime: &Runtime) -> Self::State {
        ScalarState::new(runtime, self)
    }
}

impl Runtime {
    /// Create a state handle in this runtime.
    pub fn state<T: IntoState>(&self, initial: T) -> T::State {
        initial.into_state(self)
    }

    /// Create a scalar state of any comparable type.
    pub fn scalar<T>(&self, initial: T) -> ScalarState<T>
    where
        T: Clone + Equal + 'static,
    {
        ScalarState::new(self, initial)
    }

    /// Create a reactive object from a record or array value.
    ///
    /// Any other value yields a record with no reactive properties.
    pub fn object(&self, initial: Value) -> ReactiveObject {
        match initial {
            Value::Object(record) => ReactiveObject::new(self, record),
            Value::Array(items) => ReactiveObject::from_array(self, items),
            _ => ReactiveObject::new(self, Record::new()),
        }
    }
}

/// Create a state handle in the current thread's runtime.
///
/// ```
/// use ripple_core::state;
///
/// let count = state(0);
/// assert_eq!(count.value(), 0);
/// count.set_value(1);
/// assert_eq!(count.value(), 1);
/// ```
pub fn state<T: IntoState>(initial: T) -> T::State {
    initial.into_state(&Runtime::current())
}

/// Create a scalar state of any comparable type in the current thread's
/// runtime.
pub fn scalar<T>(initial: T) -> ScalarState<T>
where
    T: Clone + Equal + 'static,
{
    ScalarState::new(&Runtime::current(), initial)
}
