//! Modular dependency injection.
//!
//! Modules declare how abstract types map onto realizations; the injector
//! resolves requested types by composing those bindings, wiring declared
//! dependencies recursively, honoring scopes, composing interceptors, and
//! handing out lazy providers, multibindings and keyed map bindings.
//!
//! ```
//! use bindery::{constructible, Injectable, Injector, Module, Realize, Shared};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct HelloGreeter;
//!
//! impl Greeter for HelloGreeter {
//!     fn greet(&self) -> String {
//!         "Hello World".to_string()
//!     }
//! }
//! impl Injectable for HelloGreeter {}
//! constructible!(HelloGreeter);
//! impl Realize<dyn Greeter> for HelloGreeter {
//!     fn realize(this: Shared<Self>) -> Shared<dyn Greeter> {
//!         this
//!     }
//! }
//!
//! struct GreeterModule;
//! impl Module for GreeterModule {
//!     fn configure(&self, injector: &Injector) {
//!         injector.bind::<dyn Greeter>().to::<HelloGreeter>();
//!     }
//! }
//!
//! let injector = Injector::new(vec![Box::new(GreeterModule)]).unwrap();
//! let greeter = injector.get_instance::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Hello World");
//! ```

pub mod binding;
pub mod error;
pub mod injectable;
pub mod injector;
pub mod inspect;
pub mod instance;
pub mod key;
pub mod macros;
pub mod module;
pub mod provider;
pub mod resolve_guard;
pub mod runtime;
pub mod scope;

pub use binding::{Binding, BindingBuilder};
pub use error::{Error, ErrorKind};
pub use injectable::{Construct, Injectable, Intercept, Realize};
pub use injector::Injector;
pub use inspect::{BindingReport, Inspector};
pub use instance::Instance;
pub use key::TypeKey;
pub use module::{try_module, Module, ModuleFunc};
pub use provider::{MapProvider, MultiProvider, Provider};
pub use resolve_guard::{enable_circular_tracing, enable_injection_tracing};
pub use runtime::{IntoShared, Shared, Store};
pub use scope::{
    child_singleton, reset_scopes, singleton, ChildSingletonScope, Scope, SingletonScope,
};
