//! Error types for the container.
//!
//! A lightweight error model shared by registration, resolution, scope
//! handling and module initialization.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category and a human-readable message.
//!
//! The helpers on `Error` keep call sites concise and error messages
//! consistent. Resolution errors are additionally wrapped with the injection
//! path (`injecting into Type.field: ...`) as they bubble out of nested
//! injections.
//!
//! # Examples
//!
//! ```
//! use bindery::Error;
//!
//! let err = Error::unresolvable("app::Service", "backup");
//! assert!(err.message.contains("app::Service"));
//! ```

use core::fmt;

use tracing::error;

/// Error categories for the container.
///
/// Intentionally coarse-grained: each variant names a failure class a caller
/// can act on, with the detail in the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An override targets a `(type, annotation)` slot with no binding.
    UnknownBinding,
    /// Two distinct bindings share the same `(type, annotation)` slot.
    DuplicateBinding,
    /// A binding names a scope that is not bound to the injector.
    UnknownScope,
    /// No binding applies and the type cannot be constructed on demand.
    Unresolvable,
    /// The cycle tracer found a repeated entry on the resolution path.
    CircularDependency,
    /// A binding's target loops back to the type it is bound for.
    SelfCycle,
    /// A provider factory or thunk failed to produce a value.
    ProviderFailed,
    /// A stored value did not carry the requested type.
    TypeMismatch,
    /// A module aborted abnormally during `try_module`.
    ModulePanic,
}

/// Container error.
///
/// `kind` enables programmatic handling, `message` is human-readable.
#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    /// Creates a new error with the given kind and message and logs it.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
        };
        error!("{}", error);
        error
    }

    /// Override target was never bound.
    pub fn unknown_binding(type_name: &str, annotation: &str) -> Self {
        Self::new(
            ErrorKind::UnknownBinding,
            format!(
                "cannot override unknown binding {:?} (annotated with {:?})",
                type_name, annotation
            ),
        )
    }

    /// Two distinct bindings occupy the same annotated slot.
    pub fn duplicate_binding(type_name: &str, annotation: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateBinding,
            format!(
                "already known binding for {:?} with annotation {:?}",
                type_name, annotation
            ),
        )
    }

    /// Binding references a scope the injector does not know.
    pub fn unknown_scope(scope_name: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownScope,
            format!("unknown scope {:?} for {:?}", scope_name, type_name),
        )
    }

    /// Nothing is bound and the type cannot be constructed on demand.
    pub fn unresolvable(type_name: &str, annotation: &str) -> Self {
        let message = if annotation.is_empty() {
            format!("can not resolve {:?}", type_name)
        } else {
            format!(
                "can not resolve {:?} with annotation {:?}",
                type_name, annotation
            )
        };
        Self::new(ErrorKind::Unresolvable, message)
    }

    /// Repeated entry on the resolution path.
    ///
    /// Carried inside the circular-dependency panic payload so `try_module`
    /// can surface the chain.
    pub fn circular_dependency(chain: &[String]) -> Self {
        Self::new(
            ErrorKind::CircularDependency,
            format!("detected circular dependency: {}", chain.join(" -> ")),
        )
    }

    /// A `to` edge points at the type it is bound for.
    pub fn self_cycle(type_name: &str, annotation: &str) -> Self {
        Self::new(
            ErrorKind::SelfCycle,
            format!(
                "circular binding from {:?} to itself (annotated with {:?})",
                type_name, annotation
            ),
        )
    }

    /// Provider factory or thunk failure.
    pub fn provider_failed(type_name: &str, cause: &str) -> Self {
        Self::new(
            ErrorKind::ProviderFailed,
            format!("provider for {:?} failed: {}", type_name, cause),
        )
    }

    /// Stored value does not carry the requested type.
    pub fn type_mismatch(type_name: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("type mismatch when resolving {:?}", type_name),
        )
    }

    /// A module panicked during `try_module`.
    pub fn module_panic(cause: &str) -> Self {
        Self::new(
            ErrorKind::ModulePanic,
            format!("module initialization panicked: {}", cause),
        )
    }

    /// Prefixes the message with the record field being injected, keeping
    /// the original kind.
    pub fn while_injecting(self, record: &str, field: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("injecting into {}.{}: {}", record, field, self.message),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
