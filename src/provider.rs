//! Lazy provider thunks.
//!
//! A [`Provider<T>`] is an injected value that resolves `T` from the
//! container when invoked, not when it was injected. Providers are the
//! designed cycle breaker: a binding graph with a cycle is legal as long as
//! one edge on every cycle is a provider edge, because the thunk defers that
//! edge until somebody calls it. Each invocation runs on a detached cycle
//! trace for the same reason.
//!
//! Two call shapes are offered on every provider:
//!
//! - [`get`](Provider::get) panics on failure, wrapping the cause. This is
//!   the shape for callers that treat resolution failure as fatal.
//! - [`try_get`](Provider::try_get) returns the failure as an [`Error`].
//!
//! [`MultiProvider<T>`] and [`MapProvider<T>`] are the collection-shaped
//! variants; they dispatch to the multibinding and mapbinding paths at call
//! time. All providers are `Default`-constructible in an unbound state so
//! that records holding them can derive `Default`; invoking an unbound
//! provider fails (or panics, for `get`).
//!
//! # Examples
//!
//! ```
//! use bindery::{Injector, ModuleFunc, Provider};
//!
//! let injector = Injector::new(vec![Box::new(ModuleFunc::new(|injector: &Injector| {
//!     injector.bind::<String>().to_instance("lazy".to_string());
//! }))])
//! .unwrap();
//!
//! let provider: Provider<String> = injector.provider_of::<String>("");
//! assert_eq!(*provider.get(), "lazy");
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::binding::Binding;
use crate::error::Error;
use crate::injector::{Ctor, Injector};
use crate::key::TypeKey;
use crate::resolve_guard::DetachedTrace;
use crate::runtime::Shared;

enum State<T: ?Sized + Send + Sync + 'static> {
    /// The zero value; invoking it fails.
    Unbound,
    /// Resolves through the regular lookup, optionally constructing.
    General {
        injector: Injector,
        annotation: String,
        construct: Option<Ctor<T>>,
    },
    /// Pinned to one binding; multi- and map-binding entries use this so
    /// every thunk keeps the identity of the binding it was made from.
    Bound {
        injector: Injector,
        annotation: String,
        binding: Binding,
    },
}

impl<T: ?Sized + Send + Sync + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        match self {
            State::Unbound => State::Unbound,
            State::General {
                injector,
                annotation,
                construct,
            } => State::General {
                injector: injector.clone(),
                annotation: annotation.clone(),
                construct: *construct,
            },
            State::Bound {
                injector,
                annotation,
                binding,
            } => State::Bound {
                injector: injector.clone(),
                annotation: annotation.clone(),
                binding: binding.clone(),
            },
        }
    }
}

/// Lazily resolves one `T` per invocation.
pub struct Provider<T: ?Sized + Send + Sync + 'static> {
    state: State<T>,
}

impl<T: ?Sized + Send + Sync + 'static> Provider<T> {
    pub(crate) fn general(
        injector: Injector,
        annotation: &str,
        construct: Option<Ctor<T>>,
    ) -> Self {
        Self {
            state: State::General {
                injector,
                annotation: annotation.to_string(),
                construct,
            },
        }
    }

    pub(crate) fn bound(injector: Injector, annotation: &str, binding: Binding) -> Self {
        Self {
            state: State::Bound {
                injector,
                annotation: annotation.to_string(),
                binding,
            },
        }
    }

    /// Resolves the value, returning failures as errors.
    pub fn try_get(&self) -> Result<Shared<T>, Error> {
        match &self.state {
            State::Unbound => Err(Error::provider_failed(
                TypeKey::of::<T>().name(),
                "provider is not bound to an injector",
            )),
            State::General {
                injector,
                annotation,
                construct,
            } => {
                let _detached = DetachedTrace::begin();
                injector.resolve_required::<T>(annotation, *construct)
            }
            State::Bound {
                injector,
                annotation,
                binding,
            } => {
                let _detached = DetachedTrace::begin();
                injector.resolve_bound::<T>(binding, annotation)
            }
        }
    }

    /// Resolves the value; failure is fatal.
    pub fn get(&self) -> Shared<T> {
        self.try_get()
            .unwrap_or_else(|err| panic!("provider for {:?}: {}", TypeKey::of::<T>().name(), err))
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Provider<T> {
    fn default() -> Self {
        Self {
            state: State::Unbound,
        }
    }
}

/// Lazily resolves the multibinding list of `T` per invocation.
pub struct MultiProvider<T: ?Sized + Send + Sync + 'static> {
    state: Option<(Injector, String)>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> MultiProvider<T> {
    pub(crate) fn new(injector: Injector, annotation: &str) -> Self {
        Self {
            state: Some((injector, annotation.to_string())),
            _marker: PhantomData,
        }
    }

    pub fn try_get(&self) -> Result<Vec<Shared<T>>, Error> {
        match &self.state {
            None => Err(Error::provider_failed(
                TypeKey::of::<T>().name(),
                "provider is not bound to an injector",
            )),
            Some((injector, annotation)) => {
                let _detached = DetachedTrace::begin();
                injector.get_annotated_all::<T>(annotation)
            }
        }
    }

    pub fn get(&self) -> Vec<Shared<T>> {
        self.try_get()
            .unwrap_or_else(|err| panic!("provider for {:?}: {}", TypeKey::of::<T>().name(), err))
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for MultiProvider<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for MultiProvider<T> {
    fn default() -> Self {
        Self {
            state: None,
            _marker: PhantomData,
        }
    }
}

/// Lazily resolves the mapbinding table of `T` per invocation.
pub struct MapProvider<T: ?Sized + Send + Sync + 'static> {
    state: Option<(Injector, String)>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> MapProvider<T> {
    pub(crate) fn new(injector: Injector, annotation: &str) -> Self {
        Self {
            state: Some((injector, annotation.to_string())),
            _marker: PhantomData,
        }
    }

    pub fn try_get(&self) -> Result<HashMap<String, Shared<T>>, Error> {
        match &self.state {
            None => Err(Error::provider_failed(
                TypeKey::of::<T>().name(),
                "provider is not bound to an injector",
            )),
            Some((injector, annotation)) => {
                let _detached = DetachedTrace::begin();
                injector.get_annotated_map::<T>(annotation)
            }
        }
    }

    pub fn get(&self) -> HashMap<String, Shared<T>> {
        self.try_get()
            .unwrap_or_else(|err| panic!("provider for {:?}: {}", TypeKey::of::<T>().name(), err))
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for MapProvider<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for MapProvider<T> {
    fn default() -> Self {
        Self {
            state: None,
            _marker: PhantomData,
        }
    }
}
