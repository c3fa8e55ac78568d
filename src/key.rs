//! Type keys identifying binding slots.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reserved annotation prefix addressing a single map-binding entry.
const MAP_PREFIX: &str = "map:";

/// Nominal handle for a bindable type.
///
/// Works for concrete types and trait objects alike. Equality and hashing
/// use the `TypeId` only; the name is kept for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Splits a `map:key` annotation into its map-binding key, if it is one.
pub(crate) fn map_binding_key(annotation: &str) -> Option<&str> {
    annotation.strip_prefix(MAP_PREFIX)
}
