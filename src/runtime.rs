//! Runtime type aliases for shared ownership and interior mutability.
//!
//! The container hands out reference-counted values and keeps its registry
//! behind read-write locks. These aliases name the two roles:
//!
//! - [`Shared<T>`]: smart pointer for shared ownership of resolved values.
//! - [`Store<T>`]: lock providing interior mutability for registry tables.

use std::sync::Arc;

/// Shared ownership of a resolved value.
///
/// Every resolution returns a `Shared<T>`; scoped resolutions return clones
/// of the same allocation, so identity can be checked with
/// [`Shared::ptr_eq`].
pub type Shared<T> = Arc<T>;

/// Interior mutability for registry tables.
///
/// Registration writes, resolution reads. `parking_lot` locks do not poison,
/// so a panicking module cannot wedge the registry for `try_module`.
pub type Store<T> = parking_lot::RwLock<T>;

/// Conversion of factory return values into a [`Shared<T>`].
///
/// Providers and instance bindings may hand over either a plain value (which
/// gets wrapped) or an already-shared pointer (which may carry an unsizing
/// coercion done at the call site, e.g. `Shared<Impl>` into
/// `Shared<dyn Service>`).
pub trait IntoShared<T: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    fn into_shared(self) -> Shared<T>;
}

impl<T: Send + Sync + 'static> IntoShared<T> for T {
    fn into_shared(self) -> Shared<T> {
        Shared::new(self)
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoShared<T> for Shared<T> {
    fn into_shared(self) -> Shared<T> {
        self
    }
}
