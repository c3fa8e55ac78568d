//! Traits wiring user types into the container.
//!
//! Four seams, each one capability:
//!
//! - [`Injectable`]: assign dependencies into an existing value (setup
//!   injection, used by `request_injection` and interceptor wrappers).
//! - [`Construct`]: materialize a value on demand when no binding terminal
//!   applies. Derive it with [`constructible!`](crate::constructible) for
//!   `Default` types, or implement it constructor-style.
//! - [`Realize`]: declare that a type realizes an abstraction, carrying the
//!   pointer coercion a `to` edge needs.
//! - [`Intercept`]: the decorator contract for [`bind_interceptor`]
//!   (wrap the underlying value, hand back the abstraction).
//!
//! [`bind_interceptor`]: crate::Injector::bind_interceptor
//!
//! # Examples
//!
//! ```
//! use bindery::{constructible, Injectable, Injector, Realize, Shared};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct EnglishGreeter {
//!     message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         self.message.clone()
//!     }
//! }
//!
//! impl Injectable for EnglishGreeter {
//!     fn inject(&mut self, injector: &Injector) -> Result<(), bindery::Error> {
//!         self.message = (*injector.get_instance::<String>()?).clone();
//!         Ok(())
//!     }
//! }
//! constructible!(EnglishGreeter);
//!
//! impl Realize<dyn Greeter> for EnglishGreeter {
//!     fn realize(this: Shared<Self>) -> Shared<dyn Greeter> {
//!         this
//!     }
//! }
//! ```

use crate::error::Error;
use crate::injector::Injector;
use crate::runtime::Shared;

/// A value the container can inject dependencies into.
///
/// The default body injects nothing, so leaf types opt in with a one-line
/// impl. Implementations resolve each dependency from the injector and
/// assign it; this is also where a type decides annotations and optionality
/// for its slots (see [`inject_field!`](crate::inject_field)).
pub trait Injectable: Send + Sync + 'static {
    fn inject(&mut self, injector: &Injector) -> Result<(), Error> {
        let _ = injector;
        Ok(())
    }
}

/// A record the container may build on demand.
///
/// Reached when a request or a `to` edge ends at this type without a
/// binding terminal. `constructible!` derives the zero-value-then-inject
/// form; hand-written impls build the value constructor-style instead.
pub trait Construct: Injectable + Sized {
    fn construct(injector: &Injector) -> Result<Self, Error>;
}

/// Declares that `Self` realizes the abstraction `A`.
///
/// The impl body is where the pointer coercion happens, so a concrete type
/// can stand in for a trait object and a sub-trait object can stand in for
/// its super-trait object.
pub trait Realize<A: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    fn realize(this: Shared<Self>) -> Shared<A>;
}

/// Decorator for every resolution of the abstraction `A`.
///
/// The wrapper keeps the underlying value in a field and re-exposes the
/// abstraction; the container injects the wrapper's own dependencies after
/// wrapping.
pub trait Intercept<A: ?Sized + Send + Sync + 'static>: Injectable + Sized {
    fn wrap(inner: Shared<A>) -> Self;
    fn into_abstract(self) -> Shared<A>;
}
