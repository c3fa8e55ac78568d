//! Binding records and the fluent binding builder.
//!
//! A [`Binding`] maps an abstract type slot onto a realization: another
//! type, a factory, a pre-built value, or direct construction of the
//! declared type. [`BindingBuilder`] is the fluent surface returned by
//! `bind`, `bind_multi`, `bind_map` and `override_binding`; it mutates the
//! registered binding in place while the injector is in its configuration
//! phase.

use std::marker::PhantomData;

use crate::error::Error;
use crate::injectable::{Construct, Realize};
use crate::injector::Injector;
use crate::instance::Instance;
use crate::key::TypeKey;
use crate::resolve_guard::ResolveGuard;
use crate::runtime::{IntoShared, Shared, Store};
use crate::scope::{Scope, SingletonScope};

pub(crate) type SharedBinding = Shared<Store<Binding>>;

/// Realizes a binding target from the injector.
pub(crate) type FactoryFn = Shared<dyn Fn(&Injector) -> Result<Instance, Error> + Send + Sync>;

/// Constructs the declared type; receives the annotation for the trace.
pub(crate) type ConstructFn =
    Shared<dyn Fn(&Injector, &str) -> Result<Instance, Error> + Send + Sync>;

/// Resolves the binding's own declared type through the full pipeline.
/// Captured when the binding is created, used for eager singletons.
pub(crate) type SelfResolveFn = Shared<dyn Fn(&Injector, &str) -> Result<(), Error> + Send + Sync>;

/// The realization a binding points at. At most one per binding; builder
/// terminals replace any previous choice.
pub(crate) enum Target {
    To { key: TypeKey, resolve: FactoryFn },
    Provider { factory: FactoryFn },
    Instance(Instance),
    Construct { construct: ConstructFn },
}

impl Clone for Target {
    fn clone(&self) -> Self {
        match self {
            Target::To { key, resolve } => Target::To {
                key: *key,
                resolve: resolve.clone(),
            },
            Target::Provider { factory } => Target::Provider {
                factory: factory.clone(),
            },
            Target::Instance(instance) => Target::Instance(instance.clone()),
            Target::Construct { construct } => Target::Construct {
                construct: construct.clone(),
            },
        }
    }
}

/// Where a binding was registered; map bindings reject annotations since the
/// map key plays that role.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum BindingFlavor {
    Single,
    Multi,
    Map,
}

/// Declarative record mapping an abstract type slot onto a realization.
#[derive(Clone)]
pub struct Binding {
    pub(crate) typ: TypeKey,
    pub(crate) annotated_with: String,
    pub(crate) target: Option<Target>,
    pub(crate) scope: Option<TypeKey>,
    pub(crate) eager: bool,
    pub(crate) flavor: BindingFlavor,
    pub(crate) resolve_self: SelfResolveFn,
}

impl Binding {
    pub(crate) fn new<T: ?Sized + Send + Sync + 'static>(flavor: BindingFlavor) -> Self {
        Self {
            typ: TypeKey::of::<T>(),
            annotated_with: String::new(),
            target: None,
            scope: None,
            eager: false,
            flavor,
            resolve_self: Shared::new(|injector: &Injector, annotation: &str| {
                injector.resolve_for_eager::<T>(annotation)
            }),
        }
    }

    /// The declared abstract type of this binding.
    pub fn type_key(&self) -> TypeKey {
        self.typ
    }

    pub fn annotation(&self) -> &str {
        &self.annotated_with
    }

    /// The `to` target, when the binding forwards to another type.
    pub fn to_key(&self) -> Option<TypeKey> {
        match &self.target {
            Some(Target::To { key, .. }) => Some(*key),
            _ => None,
        }
    }

    pub fn has_provider(&self) -> bool {
        matches!(&self.target, Some(Target::Provider { .. }))
    }

    pub fn has_instance(&self) -> bool {
        matches!(&self.target, Some(Target::Instance(_)))
    }

    pub fn scope_key(&self) -> Option<TypeKey> {
        self.scope
    }

    pub fn is_eager(&self) -> bool {
        self.eager
    }

    /// Structural equality: same slot, same scope and eagerness, and the
    /// same realization (by target identity).
    pub(crate) fn equal(&self, other: &Binding) -> bool {
        if self.typ != other.typ
            || self.annotated_with != other.annotated_with
            || self.scope != other.scope
            || self.eager != other.eager
        {
            return false;
        }
        match (&self.target, &other.target) {
            (None, None) => true,
            (Some(Target::To { key: a, .. }), Some(Target::To { key: b, .. })) => a == b,
            (Some(Target::Provider { factory: a }), Some(Target::Provider { factory: b })) => {
                Shared::ptr_eq(a, b)
            }
            (Some(Target::Instance(a)), Some(Target::Instance(b))) => a.ptr_eq(b),
            (Some(Target::Construct { construct: a }), Some(Target::Construct { construct: b })) => {
                Shared::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

/// Fluent builder over a registered binding.
///
/// Returned by [`Injector::bind`](crate::Injector::bind) and friends; every
/// method mutates the underlying binding in place and hands the builder back
/// for chaining.
pub struct BindingBuilder<T: ?Sized + Send + Sync + 'static> {
    binding: SharedBinding,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> BindingBuilder<T> {
    pub(crate) fn new(binding: SharedBinding) -> Self {
        Self {
            binding,
            _marker: PhantomData,
        }
    }

    pub(crate) fn shared_binding(&self) -> SharedBinding {
        self.binding.clone()
    }

    /// Binds to a concrete realization. The target resolves through its own
    /// bindings (with the annotation dropped) and may be constructed on
    /// demand when nothing else applies.
    pub fn to<U>(self) -> Self
    where
        U: Construct + Realize<T>,
    {
        let resolve: FactoryFn =
            Shared::new(move |injector: &Injector| -> Result<Instance, Error> {
                let value = injector.resolve_edge_constructing::<U>()?;
                Ok(Instance::of::<T>(<U as Realize<T>>::realize(value)))
            });
        self.binding.write().target = Some(Target::To {
            key: TypeKey::of::<U>(),
            resolve,
        });
        self
    }

    /// Binds to another abstraction. The target must have a binding of its
    /// own; there is no on-demand construction for abstract targets.
    pub fn to_abstract<U>(self) -> Self
    where
        U: ?Sized + Realize<T> + Send + Sync + 'static,
    {
        let resolve: FactoryFn =
            Shared::new(move |injector: &Injector| -> Result<Instance, Error> {
                let value = injector.resolve_edge_lookup::<U>()?;
                Ok(Instance::of::<T>(<U as Realize<T>>::realize(value)))
            });
        self.binding.write().target = Some(Target::To {
            key: TypeKey::of::<U>(),
            resolve,
        });
        self
    }

    /// Binds to a factory. The factory receives the injector and resolves
    /// its own dependencies from it.
    pub fn to_provider<R, F>(self, factory: F) -> Self
    where
        R: IntoShared<T>,
        F: Fn(&Injector) -> R + Send + Sync + 'static,
    {
        let factory: FactoryFn =
            Shared::new(move |injector: &Injector| -> Result<Instance, Error> {
                Ok(Instance::of::<T>(factory(injector).into_shared()))
            });
        self.binding.write().target = Some(Target::Provider { factory });
        self
    }

    /// Binds to a fallible factory.
    pub fn to_try_provider<R, F>(self, factory: F) -> Self
    where
        R: IntoShared<T>,
        F: Fn(&Injector) -> Result<R, Error> + Send + Sync + 'static,
    {
        let factory: FactoryFn =
            Shared::new(move |injector: &Injector| -> Result<Instance, Error> {
                factory(injector).map(|value| Instance::of::<T>(value.into_shared()))
            });
        self.binding.write().target = Some(Target::Provider { factory });
        self
    }

    /// Binds to a pre-built value.
    ///
    /// Inherently a singleton: every resolution returns the stored value,
    /// so no scope routing is involved.
    pub fn to_instance(self, value: impl IntoShared<T>) -> Self {
        self.binding.write().target = Some(Target::Instance(Instance::of::<T>(value.into_shared())));
        self
    }

    /// Resolves by constructing the declared type directly (for
    /// `constructible!` types: zero value plus injection).
    pub fn to_default(self) -> Self
    where
        T: Construct,
    {
        let construct: ConstructFn = Shared::new(
            move |injector: &Injector, annotation: &str| -> Result<Instance, Error> {
                let _guard = ResolveGuard::enter(TypeKey::of::<T>(), annotation);
                T::construct(injector).map(|value| Instance::of::<T>(Shared::new(value)))
            },
        );
        self.binding.write().target = Some(Target::Construct { construct });
        self
    }

    /// Qualifies the binding with an annotation.
    ///
    /// # Panics
    ///
    /// Panics on map bindings; the map key discriminates those.
    pub fn annotated_with(self, annotation: &str) -> Self {
        let mut binding = self.binding.write();
        if binding.flavor == BindingFlavor::Map {
            panic!(
                "can not annotate map binding for {} (the map key discriminates entries)",
                binding.typ
            );
        }
        binding.annotated_with = annotation.to_string();
        drop(binding);
        self
    }

    /// Places the binding in a scope. The scope type must be bound to the
    /// injector by the time the binding resolves.
    pub fn in_scope<S: Scope>(self) -> Self {
        self.binding.write().scope = Some(TypeKey::of::<S>());
        self
    }

    /// Singleton scope plus materialization during `init_modules`.
    pub fn as_eager_singleton(self) -> Self {
        let mut binding = self.binding.write();
        binding.scope = Some(TypeKey::of::<SingletonScope>());
        binding.eager = true;
        drop(binding);
        self
    }
}
