//! Type-check-and-extract on dynamically typed values.
//!
//! [`Dynamic`] holds a value of erased type. [`Dynamic::type_assert`] checks
//! the exact dynamic type and borrows the value in place. [`legacy_assert`]
//! is the generic form: it first copies the value out into a fresh
//! `Box<dyn Any>` and downcasts that copy. Both agree on every input; only
//! the copy differs.

use std::any::{type_name, Any};
use std::fmt;

trait AnyClone: Any + Send + Sync {
    fn clone_box(&self) -> Box<dyn AnyClone>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + Clone + Send + Sync> AnyClone for T {
    fn clone_box(&self) -> Box<dyn AnyClone> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A value whose static type has been erased.
pub struct Dynamic {
    value: Box<dyn AnyClone>,
    type_name: &'static str,
}

impl Dynamic {
    pub fn new<T: Any + Clone + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the dynamic type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Copies the value out into a fresh box.
    pub fn interface(&self) -> Box<dyn Any> {
        (*self.value).clone_box().into_any()
    }

    /// Borrows the value as `T` if the dynamic type is exactly `T`.
    pub fn type_assert<T: Any>(&self) -> Option<&T> {
        type_assert((*self.value).as_any())
    }

    /// Moves the value out as `T` if the dynamic type is exactly `T`.
    pub fn into_inner<T: Any>(self) -> Option<T> {
        type_assert_boxed(self.value.into_any()).ok()
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Borrows `value` as `T` if its dynamic type is exactly `T`.
pub fn type_assert<T: Any>(value: &dyn Any) -> Option<&T> {
    value.downcast_ref::<T>()
}

/// Moves the boxed value out as `T`; on mismatch the box is handed back.
pub fn type_assert_boxed<T: Any>(value: Box<dyn Any>) -> Result<T, Box<dyn Any>> {
    value.downcast::<T>().map(|boxed| *boxed)
}

/// Generic check-then-convert: copy out, then downcast the copy.
///
/// Returns `(T::default(), false)` on mismatch.
pub fn legacy_assert<T: Any + Default>(value: &Dynamic) -> (T, bool) {
    match type_assert_boxed::<T>(value.interface()) {
        Ok(extracted) => (extracted, true),
        Err(_) => (T::default(), false),
    }
}
