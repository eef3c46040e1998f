//! Convenience macros.

/// Clone variables into a move closure.
///
/// Effects usually capture handles they also use outside the closure; this
/// saves writing the clones by hand.
///
/// ```
/// use ripple_core::{cloned, effect, signal};
///
/// let a = signal(1);
/// let b = signal(2);
///
/// effect(cloned!(a, b => move || {
///     let _ = a.get() + b.get();
/// }));
/// assert_eq!(a.subscriber_count(), 1);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Declare a struct whose fields are reactive cells.
///
/// This is the typed form of a composite state: the property table is the
/// struct itself, fixed at compile time, and each field is a
/// [`Signal`](crate::reactive::Signal) with its own subscribers. A generated
/// `new` allocates every cell in the given runtime.
///
/// ```
/// use ripple_core::reactive::Runtime;
/// use ripple_core::reactive_struct;
///
/// reactive_struct! {
///     #[derive(Debug)]
///     pub struct Point {
///         pub x: i32,
///         pub y: i32,
///     }
/// }
///
/// let runtime = Runtime::new();
/// let point = Point::new(&runtime, 1, 2);
/// point.x.set(5);
/// assert_eq!(point.x.get() + point.y.get(), 7);
/// ```
#[macro_export]
macro_rules! reactive_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $crate::reactive::Signal<$ty>,
            )*
        }

        impl $name {
            /// Allocate one cell per field in `runtime`.
            #[allow(clippy::too_many_arguments)]
            $vis fn new(runtime: &$crate::reactive::Runtime, $($field: $ty),*) -> Self {
                Self {
                    $( $field: runtime.signal($field), )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::reactive::Runtime;
    use std::cell::Cell;
    use std::rc::Rc;

    reactive_struct! {
        struct Form {
            name: String,
            age: u32,
        }
    }

    #[test]
    fn struct_fields_track_independently() {
        let runtime = Runtime::new();
        let form = Form::new(&runtime, "ada".into(), 36);
        let runs = Rc::new(Cell::new(0));

        runtime.effect(cloned!(form, runs => move || {
            form.name.get();
            runs.set(runs.get() + 1);
        }));

        form.age.set(37);
        assert_eq!(runs.get(), 1);

        form.name.set("grace".into());
        assert_eq!(runs.get(), 2);
    }
}
