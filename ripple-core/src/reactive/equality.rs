//! Structural Equality
//!
//! Writes to a reactive cell are gated by [`equal`]: when the candidate value
//! is structurally equal to the current one the write is a no-op and no
//! subscriber runs.
//!
//! # Rules
//!
//! 1. Identical or primitive-equal values are equal.
//! 2. NaN equals NaN.
//! 3. A missing value (`None`, `Null`, `Undefined`) never equals a present
//!    one, and values of different kinds are never equal.
//! 4. Sequences are equal when they have the same length and every positional
//!    pair is equal.
//! 5. Records (maps) are equal when they have the same number of keys, every
//!    key of one is present in the other and the values under each key are
//!    equal. Sets follow the same cardinality and membership rule.
//! 6. Anything else falls back to identity (see [`Opaque`](crate::value::Opaque)).
//!
//! Recursion depth is bounded by the depth of the inputs. Cyclic structures
//! (only constructible through `Rc` cycles) are not detected.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::value::Value;

/// Structural equality used to decide whether a write changes a cell.
pub trait Equal {
    /// Returns `true` if `self` and `other` are structurally equal.
    fn equal(&self, other: &Self) -> bool;
}

/// Compare two values with the [`Equal`] rules.
///
/// ```
/// use ripple_core::reactive::equal;
///
/// assert!(equal(&f64::NAN, &f64::NAN));
/// assert!(equal(&vec![1, 2, 3], &vec![1, 2, 3]));
/// assert!(!equal(&Some(0), &None));
/// ```
pub fn equal<T: Equal + ?Sized>(a: &T, b: &T) -> bool {
    a.equal(b)
}

macro_rules! impl_equal_via_partial_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl Equal for $t {
                #[inline]
                fn equal(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_equal_via_partial_eq!(
    (), bool, char, str, String,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
);

impl Equal for f64 {
    #[inline]
    fn equal(&self, other: &Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }
}

impl Equal for f32 {
    #[inline]
    fn equal(&self, other: &Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }
}

impl<T: Equal> Equal for Option<T> {
    fn equal(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equal(b),
            _ => false,
        }
    }
}

impl<T: Equal> Equal for [T] {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.equal(b))
    }
}

impl<T: Equal, const N: usize> Equal for [T; N] {
    fn equal(&self, other: &Self) -> bool {
        self[..].equal(&other[..])
    }
}

impl<T: Equal> Equal for Vec<T> {
    fn equal(&self, other: &Self) -> bool {
        self[..].equal(&other[..])
    }
}

impl<T: Equal> Equal for VecDeque<T> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.equal(b))
    }
}

impl<T: Equal + ?Sized> Equal for Box<T> {
    fn equal(&self, other: &Self) -> bool {
        (**self).equal(&**other)
    }
}

impl<T: Equal + ?Sized> Equal for Rc<T> {
    fn equal(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).equal(&**other)
    }
}

impl<T: Equal + ?Sized> Equal for &T {
    fn equal(&self, other: &Self) -> bool {
        (**self).equal(&**other)
    }
}

macro_rules! impl_equal_tuple {
    ($(($($name:ident . $idx:tt),+))+) => {
        $(
            impl<$($name: Equal),+> Equal for ($($name,)+) {
                fn equal(&self, other: &Self) -> bool {
                    $(self.$idx.equal(&other.$idx))&&+
                }
            }
        )+
    };
}

impl_equal_tuple! {
    (A.0)
    (A.0, B.1)
    (A.0, B.1, C.2)
    (A.0, B.1, C.2, D.3)
}

impl<K: Eq + Hash, V: Equal, S: BuildHasher> Equal for HashMap<K, V, S> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v.equal(w)))
    }
}

impl<K: Ord, V: Equal> Equal for BTreeMap<K, V> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v.equal(w)))
    }
}

impl<K: Eq + Hash, V: Equal, S: BuildHasher> Equal for IndexMap<K, V, S> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v.equal(w)))
    }
}

impl<T: Eq + Hash, S: BuildHasher> Equal for HashSet<T, S> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<T: Ord> Equal for BTreeSet<T> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<T: Eq + Hash, S: BuildHasher> Equal for IndexSet<T, S> {
    fn equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl Equal for Value {
    fn equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.equal(b),
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            // A missing value only equals the same kind of missing value.
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.equal(b),
            (Value::Object(a), Value::Object(b)) => a.equal(b),
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
