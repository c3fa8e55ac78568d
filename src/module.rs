//! Modules: the units that configure bindings.
//!
//! Packages provide modules to build the binding tree. A module registers
//! its bindings in [`configure`](Module::configure) and may declare the
//! modules it depends on; `init_modules` configures dependencies first and
//! every module exactly once.
//!
//! # Examples
//!
//! ```
//! use bindery::{Injector, Module};
//!
//! struct GreetingModule;
//!
//! impl Module for GreetingModule {
//!     fn configure(&self, injector: &Injector) {
//!         injector.bind::<String>().to_instance("Hello World".to_string());
//!     }
//! }
//!
//! let injector = Injector::new(vec![Box::new(GreetingModule)]).unwrap();
//! assert_eq!(*injector.get_instance::<String>().unwrap(), "Hello World");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::Error;
use crate::injector::Injector;

/// A unit of binding configuration.
///
/// Module identity is the concrete type: listing the same module type twice
/// (directly or through dependencies) configures it once. Function-shaped
/// modules get this per value, see [`ModuleFunc`].
pub trait Module: Any + Send + Sync {
    /// Modules that must be configured before this one.
    fn depends(&self) -> Vec<Box<dyn Module>> {
        vec![]
    }

    /// Registers this module's bindings.
    fn configure(&self, injector: &Injector);
}

/// A module made from a closure.
///
/// Every closure has its own type, so independent literals are independent
/// modules while reusing one closure value deduplicates.
pub struct ModuleFunc<F>(F);

impl<F> ModuleFunc<F>
where
    F: Fn(&Injector) + Send + Sync + 'static,
{
    pub fn new(configure: F) -> Self {
        Self(configure)
    }
}

impl<F> Module for ModuleFunc<F>
where
    F: Fn(&Injector) + Send + Sync + 'static,
{
    fn configure(&self, injector: &Injector) {
        (self.0)(injector)
    }
}

/// Tests whether modules are properly bound.
///
/// Runs a full initialization with eager singletons disabled and traps any
/// abort, so fatal failures (panicking modules, circular-dependency aborts)
/// come back as ordinary errors.
pub fn try_module(modules: Vec<Box<dyn Module>>) -> Result<(), Error> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let injector = Injector::unconfigured(None);
        injector.set_build_eager_singletons(false);
        injector.init_modules(modules)
    }));
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let cause = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_string()))
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Error::module_panic(&cause))
        }
    }
}

/// Expands every module's dependencies before the module itself,
/// de-duplicating by module identity.
pub(crate) fn resolve_dependencies(
    modules: Vec<Box<dyn Module>>,
    known: &mut HashSet<TypeId>,
) -> Vec<Box<dyn Module>> {
    let mut resolved = Vec::with_capacity(modules.len());
    for module in modules {
        if !known.insert((*module).type_id()) {
            continue;
        }
        resolved.extend(resolve_dependencies(module.depends(), known));
        resolved.push(module);
    }
    resolved
}
