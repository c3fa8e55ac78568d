//! Type-erased resolved values.

use std::any::Any;

use crate::error::Error;
use crate::key::TypeKey;
use crate::runtime::Shared;

/// A resolved value with its type erased.
///
/// Holds a `Shared<T>` behind `dyn Any` so bindings, scopes and interceptor
/// chains can pass values around without knowing `T`. Typed call sites
/// recover the value with [`extract`](Instance::extract).
pub struct Instance {
    value: Shared<dyn Any + Send + Sync>,
    key: TypeKey,
}

impl Instance {
    pub fn of<T: ?Sized + Send + Sync + 'static>(value: Shared<T>) -> Self {
        Self {
            value: Shared::new(value),
            key: TypeKey::of::<T>(),
        }
    }

    /// Recovers the typed value. Fails when the instance was erased from a
    /// different type than the one requested.
    pub fn extract<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Shared<T>, Error> {
        self.value
            .downcast_ref::<Shared<T>>()
            .cloned()
            .ok_or_else(|| Error::type_mismatch(TypeKey::of::<T>().name()))
    }

    /// The key of the type this instance was erased from.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Identity comparison of the erased allocation.
    pub(crate) fn ptr_eq(&self, other: &Instance) -> bool {
        Shared::ptr_eq(&self.value, &other.value)
    }
}

impl Clone for Instance {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            key: self.key,
        }
    }
}
