//! The injector: binding registry, resolver and module pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::binding::{Binding, BindingBuilder, BindingFlavor, SharedBinding, Target};
use crate::error::Error;
use crate::injectable::{Construct, Injectable, Intercept};
use crate::instance::Instance;
use crate::key::{map_binding_key, TypeKey};
use crate::module::{resolve_dependencies, Module};
use crate::provider::{MapProvider, MultiProvider, Provider};
use crate::resolve_guard::ResolveGuard;
use crate::runtime::{Shared, Store};
use crate::scope::{child_singleton, singleton, ChildSingletonScope, Scope};

/// Configuration stages. Registration happens during `Init`; once `Default`
/// is reached the binding tables are read-only for resolution.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    Default,
}

/// Construction hook threaded into the resolver by typed entry points and
/// `to` edges; runs when no binding terminal applies.
pub(crate) type Ctor<T> = fn(&Injector, &str) -> Result<Shared<T>, Error>;

/// The canonical construction hook for [`Construct`] types: guard the cycle
/// trace, then build.
pub(crate) fn construct_hook<T: Construct>(
    injector: &Injector,
    annotation: &str,
) -> Result<Shared<T>, Error> {
    let _guard = ResolveGuard::enter(TypeKey::of::<T>(), annotation);
    T::construct(injector).map(Shared::new)
}

type InterceptFn = Shared<dyn Fn(&Injector, Instance) -> Result<Instance, Error> + Send + Sync>;
type Deferred = Box<dyn FnOnce(&Injector) -> Result<(), Error> + Send + Sync>;

/// Outcome of realizing a binding's target.
enum Realization<T: ?Sized> {
    Value(Shared<T>),
    Unbound,
}

struct OverrideRecord {
    typ: TypeKey,
    annotated_with: String,
    binding: SharedBinding,
}

/// Defines bindings and resolves object graphs from them.
///
/// An injector may have a parent, which is consulted when the injector has
/// no binding of its own. Cloning the handle is cheap and every clone
/// addresses the same registry; the injector also binds its own identity, so
/// `get_instance::<Injector>()` hands the container to its dependencies.
pub struct Injector {
    inner: Shared<InjectorInner>,
}

struct InjectorInner {
    parent: Option<Injector>,
    bindings: Store<HashMap<TypeKey, Vec<SharedBinding>>>,
    multibindings: Store<HashMap<TypeKey, Vec<SharedBinding>>>,
    mapbindings: Store<HashMap<TypeKey, HashMap<String, SharedBinding>>>,
    interceptors: Store<HashMap<TypeKey, Vec<InterceptFn>>>,
    scopes: Store<HashMap<TypeKey, Shared<dyn Scope>>>,
    overrides: Store<Vec<OverrideRecord>>,
    stage: Store<Stage>,
    delayed: Store<Vec<Deferred>>,
    build_eager_singletons: AtomicBool,
}

impl Clone for Injector {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Injector {
    /// Builds an injector out of a list of modules.
    pub fn new(modules: Vec<Box<dyn Module>>) -> Result<Injector, Error> {
        let injector = Self::unconfigured(None);
        injector.init_modules(modules)?;
        Ok(injector)
    }

    /// A fresh injector with its identity and the default scopes bound, but
    /// no module pipeline run yet.
    pub(crate) fn unconfigured(parent: Option<Injector>) -> Injector {
        let injector = Injector {
            inner: Shared::new(InjectorInner {
                parent,
                bindings: Store::new(HashMap::new()),
                multibindings: Store::new(HashMap::new()),
                mapbindings: Store::new(HashMap::new()),
                interceptors: Store::new(HashMap::new()),
                scopes: Store::new(HashMap::new()),
                overrides: Store::new(Vec::new()),
                stage: Store::new(Stage::Default),
                delayed: Store::new(Vec::new()),
                build_eager_singletons: AtomicBool::new(true),
            }),
        };
        injector.bind::<Injector>().to_instance(injector.clone());
        injector.bind_scope(singleton());
        injector.bind_scope(child_singleton());
        injector
    }

    /// Derives a child injector with its own child-singleton scope.
    ///
    /// The child consults this injector for bindings it does not have;
    /// bindings placed in the child-singleton scope memoize per child.
    pub fn child(&self) -> Injector {
        let child = Self::unconfigured(Some(self.clone()));
        child.bind_scope(Shared::new(ChildSingletonScope::new()));
        child
    }

    pub(crate) fn parent(&self) -> Option<&Injector> {
        self.inner.parent.as_ref()
    }
}

/* ============================================================
 * Registration
 * ============================================================
 */

impl Injector {
    /// Creates a new binding for a type slot and returns its builder.
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&self) -> BindingBuilder<T> {
        let binding = Shared::new(Store::new(Binding::new::<T>(BindingFlavor::Single)));
        self.inner
            .bindings
            .write()
            .entry(TypeKey::of::<T>())
            .or_default()
            .push(binding.clone());
        debug!("bound {}", TypeKey::of::<T>());
        BindingBuilder::new(binding)
    }

    /// Appends a binding to the multibinding list of a type slot.
    ///
    /// Declaration order is preserved; during resolution a parent's list
    /// precedes this injector's list.
    pub fn bind_multi<T: ?Sized + Send + Sync + 'static>(&self) -> BindingBuilder<T> {
        let binding = Shared::new(Store::new(Binding::new::<T>(BindingFlavor::Multi)));
        self.inner
            .multibindings
            .write()
            .entry(TypeKey::of::<T>())
            .or_default()
            .push(binding.clone());
        BindingBuilder::new(binding)
    }

    /// Registers a binding under a key in the map-binding table of a type
    /// slot. A later binding for the same key replaces the earlier one.
    pub fn bind_map<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> BindingBuilder<T> {
        let binding = Shared::new(Store::new(Binding::new::<T>(BindingFlavor::Map)));
        self.inner
            .mapbindings
            .write()
            .entry(TypeKey::of::<T>())
            .or_default()
            .insert(key.to_string(), binding.clone());
        BindingBuilder::new(binding)
    }

    /// Decorates every resolution of the abstraction `A` with a fresh `W`.
    ///
    /// Interceptors compose outward in declaration order: the last declared
    /// wrapper ends up outermost, and a parent's interceptors wrap outside
    /// this injector's.
    pub fn bind_interceptor<A, W>(&self)
    where
        A: ?Sized + Send + Sync + 'static,
        W: Intercept<A>,
    {
        let wrap: InterceptFn = Shared::new(
            move |injector: &Injector, instance: Instance| -> Result<Instance, Error> {
                let inner = instance.extract::<A>()?;
                let mut wrapper = W::wrap(inner);
                wrapper.inject(injector)?;
                Ok(Instance::of::<A>(wrapper.into_abstract()))
            },
        );
        self.inner
            .interceptors
            .write()
            .entry(TypeKey::of::<A>())
            .or_default()
            .push(wrap);
    }

    /// Makes a scope available to bindings of this injector.
    pub fn bind_scope<S: Scope>(&self, scope: Shared<S>) {
        self.inner
            .scopes
            .write()
            .insert(TypeKey::of::<S>(), scope as Shared<dyn Scope>);
    }

    /// Schedules a replacement for the `(T, annotation)` binding slot.
    ///
    /// The returned builder configures the replacement; it is applied after
    /// all modules have run. Overriding a slot nothing else bound is an
    /// error at that point.
    pub fn override_binding<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> BindingBuilder<T> {
        let builder = self.bind::<T>().annotated_with(annotation);
        self.inner.overrides.write().push(OverrideRecord {
            typ: TypeKey::of::<T>(),
            annotated_with: annotation.to_string(),
            binding: builder.shared_binding(),
        });
        builder
    }
}

/* ============================================================
 * Module pipeline
 * ============================================================
 */

impl Injector {
    /// Runs the module pipeline: resolve module dependencies, configure each
    /// module once, apply overrides, reject duplicate bindings, flush
    /// deferred injections, and materialize eager singletons.
    pub fn init_modules(&self, modules: Vec<Box<dyn Module>>) -> Result<(), Error> {
        *self.inner.stage.write() = Stage::Init;

        let modules = resolve_dependencies(modules, &mut HashSet::new());
        debug!("configuring {} modules", modules.len());
        for module in &modules {
            module.configure(self);
        }

        self.apply_overrides()?;
        self.check_duplicates()?;

        *self.inner.stage.write() = Stage::Default;

        let delayed: Vec<Deferred> = std::mem::take(&mut *self.inner.delayed.write());
        for deferred in delayed {
            deferred(self)?;
        }

        if self.inner.build_eager_singletons.load(Ordering::SeqCst) {
            self.build_eager_singletons(false)?;
        }
        Ok(())
    }

    /// Enables or disables eager singleton materialization during
    /// `init_modules`.
    pub fn set_build_eager_singletons(&self, build: bool) {
        self.inner
            .build_eager_singletons
            .store(build, Ordering::SeqCst);
    }

    /// Resolves one instance of every binding marked eager, optionally
    /// letting the parent injectors do the same.
    pub fn build_eager_singletons(&self, include_parent: bool) -> Result<(), Error> {
        let eager: Vec<(crate::binding::SelfResolveFn, String)> = {
            let bindings = self.inner.bindings.read();
            bindings
                .values()
                .flatten()
                .filter_map(|slot| {
                    let binding = slot.read();
                    binding
                        .eager
                        .then(|| (binding.resolve_self.clone(), binding.annotated_with.clone()))
                })
                .collect()
        };
        for (resolve, annotation) in eager {
            resolve(self, &annotation)?;
        }
        if include_parent {
            if let Some(parent) = &self.inner.parent {
                return parent.build_eager_singletons(true);
            }
        }
        Ok(())
    }

    fn apply_overrides(&self) -> Result<(), Error> {
        let overrides: Vec<OverrideRecord> = std::mem::take(&mut *self.inner.overrides.write());
        let mut bindings = self.inner.bindings.write();
        for record in overrides {
            let mut replaced = false;
            if let Some(slots) = bindings.get_mut(&record.typ) {
                for slot in slots.iter_mut() {
                    if Shared::ptr_eq(slot, &record.binding) {
                        continue;
                    }
                    if slot.read().annotated_with == record.annotated_with {
                        *slot = record.binding.clone();
                        replaced = true;
                    }
                }
            }
            if !replaced {
                return Err(Error::unknown_binding(
                    record.typ.name(),
                    &record.annotated_with,
                ));
            }
        }
        Ok(())
    }

    fn check_duplicates(&self) -> Result<(), Error> {
        let bindings = self.inner.bindings.read();
        for (typ, slots) in bindings.iter() {
            let mut known: HashMap<String, Binding> = HashMap::new();
            for slot in slots {
                let binding = slot.read();
                if let Some(existing) = known.get(&binding.annotated_with) {
                    if !existing.equal(&binding) {
                        return Err(Error::duplicate_binding(
                            typ.name(),
                            &binding.annotated_with,
                        ));
                    }
                } else {
                    known.insert(binding.annotated_with.clone(), binding.clone());
                }
            }
        }
        Ok(())
    }
}

/* ============================================================
 * Resolution
 * ============================================================
 */

impl Injector {
    /// Resolves an instance of `T` through its bindings.
    pub fn get_instance<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Shared<T>, Error> {
        self.resolve_required::<T>("", None)
    }

    /// Resolves an instance of `T` for an annotated slot.
    pub fn get_annotated_instance<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> Result<Shared<T>, Error> {
        self.resolve_required::<T>(annotation, None)
    }

    /// Resolves an instance of `T`, constructing it on demand when no
    /// binding applies.
    pub fn create_instance<T: Construct>(&self) -> Result<Shared<T>, Error> {
        self.resolve_required::<T>("", Some(construct_hook::<T>))
    }

    /// Annotated variant of [`create_instance`](Injector::create_instance).
    pub fn create_annotated_instance<T: Construct>(
        &self,
        annotation: &str,
    ) -> Result<Shared<T>, Error> {
        self.resolve_required::<T>(annotation, Some(construct_hook::<T>))
    }

    /// Resolves an instance of `T` when a binding applies; a missing binding
    /// yields `None` instead of an error.
    pub fn get_optional<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> Result<Option<Shared<T>>, Error> {
        self.resolve_request::<T>(annotation, true, None)
    }

    /// Resolves all multibindings of `T`, parent entries first.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Shared<T>>, Error> {
        self.get_annotated_all::<T>("")
    }

    /// Annotated variant of [`get_all`](Injector::get_all).
    pub fn get_annotated_all<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> Result<Vec<Shared<T>>, Error> {
        let key = TypeKey::of::<T>();
        self.join_multibindings(&key, annotation)
            .iter()
            .map(|binding| match self.realize_binding::<T>(binding)? {
                Realization::Value(value) => Ok(value),
                Realization::Unbound => Err(Error::unresolvable(key.name(), annotation)),
            })
            .collect()
    }

    /// Resolves the mapbindings of `T`, the parent's entries merged under
    /// this injector's.
    pub fn get_map<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<HashMap<String, Shared<T>>, Error> {
        self.get_annotated_map::<T>("")
    }

    /// Annotated variant of [`get_map`](Injector::get_map).
    pub fn get_annotated_map<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> Result<HashMap<String, Shared<T>>, Error> {
        let key = TypeKey::of::<T>();
        self.join_mapbindings(&key, annotation)
            .into_iter()
            .map(|(entry_key, binding)| match self.realize_binding::<T>(&binding)? {
                Realization::Value(value) => Ok((entry_key, value)),
                Realization::Unbound => Err(Error::unresolvable(key.name(), annotation)),
            })
            .collect()
    }

    /// A lazy thunk resolving `T` at call time.
    pub fn provider_of<T: ?Sized + Send + Sync + 'static>(&self, annotation: &str) -> Provider<T> {
        Provider::general(self.clone(), annotation, None)
    }

    /// A lazy thunk that may also construct `T` on demand at call time.
    pub fn create_provider_of<T: Construct>(&self, annotation: &str) -> Provider<T> {
        Provider::general(self.clone(), annotation, Some(construct_hook::<T>))
    }

    /// A lazy thunk over the multibinding list of `T`.
    pub fn multi_provider_of<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> MultiProvider<T> {
        MultiProvider::new(self.clone(), annotation)
    }

    /// A lazy thunk over the mapbinding table of `T`.
    pub fn map_provider_of<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> MapProvider<T> {
        MapProvider::new(self.clone(), annotation)
    }

    /// One lazy thunk per multibinding entry of `T`, each pinned to the
    /// binding it was made from.
    pub fn get_all_providers<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> Vec<Provider<T>> {
        self.join_multibindings(&TypeKey::of::<T>(), annotation)
            .into_iter()
            .map(|binding| Provider::bound(self.clone(), annotation, binding))
            .collect()
    }

    /// One lazy thunk per mapbinding entry of `T`, keyed like the map.
    pub fn get_map_providers<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> HashMap<String, Provider<T>> {
        self.join_mapbindings(&TypeKey::of::<T>(), annotation)
            .into_iter()
            .map(|(key, binding)| (key, Provider::bound(self.clone(), annotation, binding)))
            .collect()
    }

    /// Injects into an existing value. During module configuration the
    /// request is queued and replayed once configuration completes.
    pub fn request_injection<T: Injectable>(&self, target: &Shared<Store<T>>) -> Result<(), Error> {
        if *self.inner.stage.read() == Stage::Init {
            let target = target.clone();
            self.inner.delayed.write().push(Box::new(move |injector| {
                injector.inject_into(&mut *target.write())
            }));
            return Ok(());
        }
        self.inject_into(&mut *target.write())
    }

    /// Immediately injects into an existing value.
    pub fn inject_into<T: Injectable>(&self, target: &mut T) -> Result<(), Error> {
        target.inject(self)
    }
}

/* ============================================================
 * Internal resolution machinery
 * ============================================================
 */

impl Injector {
    /// Finds the binding for `(key, annotation)`, consulting map-binding
    /// entries for `map:`-prefixed annotations and the parent chain last.
    fn find_binding(&self, key: &TypeKey, annotation: &str) -> Option<Binding> {
        if let Some(slots) = self.inner.bindings.read().get(key) {
            for slot in slots {
                let binding = slot.read();
                if binding.annotated_with == annotation {
                    return Some(binding.clone());
                }
            }
        }

        if let Some(entry_key) = map_binding_key(annotation) {
            if let Some(entries) = self.inner.mapbindings.read().get(key) {
                if let Some(slot) = entries.get(entry_key) {
                    return Some(slot.read().clone());
                }
            }
        }

        self.parent()
            .and_then(|parent| parent.find_binding(key, annotation))
    }

    fn scope_object(&self, key: &TypeKey) -> Option<Shared<dyn Scope>> {
        self.inner.scopes.read().get(key).cloned()
    }

    /// Full resolution: binding lookup, scope delegation, creation and
    /// interception. `None` is only returned for optional requests that
    /// found nothing.
    fn resolve_request<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
        optional: bool,
        construct: Option<Ctor<T>>,
    ) -> Result<Option<Shared<T>>, Error> {
        let key = TypeKey::of::<T>();
        let binding = self.find_binding(&key, annotation);

        let value = match binding.as_ref().and_then(|b| b.scope) {
            Some(scope_key) => {
                let scope = self
                    .scope_object(&scope_key)
                    .ok_or_else(|| Error::unknown_scope(scope_key.name(), key.name()))?;
                let unscoped = || -> Result<Instance, Error> {
                    match self.create_request::<T>(annotation, false, construct)? {
                        Some(value) => Ok(Instance::of::<T>(value)),
                        None => Err(Error::unresolvable(key.name(), annotation)),
                    }
                };
                let instance = scope.resolve_type(key, annotation, &unscoped)?;
                Some(instance.extract::<T>()?)
            }
            None => self.create_request::<T>(annotation, optional, construct)?,
        };

        match value {
            Some(value) => Ok(Some(self.intercept_value::<T>(value)?)),
            None => Ok(None),
        }
    }

    /// Creation rules, in order: realize the binding; retry annotated
    /// requests against the unannotated slot; refuse to construct annotated
    /// slots out of thin air; construct on demand when a hook was supplied.
    fn create_request<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
        optional: bool,
        construct: Option<Ctor<T>>,
    ) -> Result<Option<Shared<T>>, Error> {
        let key = TypeKey::of::<T>();

        if let Some(binding) = self.find_binding(&key, annotation) {
            match self.realize_binding::<T>(&binding)? {
                Realization::Value(value) => return Ok(Some(value)),
                Realization::Unbound => {
                    if !annotation.is_empty() {
                        return self.resolve_request::<T>("", false, construct);
                    }
                }
            }
        }

        if !annotation.is_empty() {
            if optional {
                return Ok(None);
            }
            return Err(Error::unresolvable(key.name(), annotation));
        }

        if let Some(construct) = construct {
            return construct(self, annotation).map(Some);
        }

        if optional {
            return Ok(None);
        }
        Err(Error::unresolvable(key.name(), annotation))
    }

    fn realize_binding<T: ?Sized + Send + Sync + 'static>(
        &self,
        binding: &Binding,
    ) -> Result<Realization<T>, Error> {
        match &binding.target {
            Some(Target::Instance(instance)) => Ok(Realization::Value(instance.extract::<T>()?)),
            Some(Target::Provider { factory }) => {
                Ok(Realization::Value(factory(self)?.extract::<T>()?))
            }
            Some(Target::To { key, resolve }) => {
                if *key == binding.typ {
                    return Err(Error::self_cycle(binding.typ.name(), &binding.annotated_with));
                }
                Ok(Realization::Value(resolve(self)?.extract::<T>()?))
            }
            Some(Target::Construct { construct }) => Ok(Realization::Value(
                construct(self, &binding.annotated_with)?.extract::<T>()?,
            )),
            None => Ok(Realization::Unbound),
        }
    }

    fn intercept_value<T: ?Sized + Send + Sync + 'static>(
        &self,
        value: Shared<T>,
    ) -> Result<Shared<T>, Error> {
        let key = TypeKey::of::<T>();
        let instance = self.apply_interceptors(&key, Instance::of::<T>(value))?;
        instance.extract::<T>()
    }

    /// This injector's wrappers first, then the parent's, so the parent's
    /// end up outermost.
    fn apply_interceptors(&self, key: &TypeKey, mut instance: Instance) -> Result<Instance, Error> {
        let wrappers: Vec<InterceptFn> = self
            .inner
            .interceptors
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default();
        for wrap in &wrappers {
            instance = wrap(self, instance)?;
        }
        match self.parent() {
            Some(parent) => parent.apply_interceptors(key, instance),
            None => Ok(instance),
        }
    }

    /// Multibindings joined across the hierarchy: parent entries first, each
    /// level in declaration order.
    fn join_multibindings(&self, key: &TypeKey, annotation: &str) -> Vec<Binding> {
        let mut joined = self
            .parent()
            .map(|parent| parent.join_multibindings(key, annotation))
            .unwrap_or_default();
        if let Some(slots) = self.inner.multibindings.read().get(key) {
            for slot in slots {
                let binding = slot.read();
                if binding.annotated_with == annotation {
                    joined.push(binding.clone());
                }
            }
        }
        joined
    }

    /// Mapbindings merged across the hierarchy; this injector's entries
    /// replace the parent's on duplicate keys.
    fn join_mapbindings(&self, key: &TypeKey, annotation: &str) -> HashMap<String, Binding> {
        let mut joined = self
            .parent()
            .map(|parent| parent.join_mapbindings(key, annotation))
            .unwrap_or_default();
        if let Some(entries) = self.inner.mapbindings.read().get(key) {
            for (entry_key, slot) in entries {
                let binding = slot.read();
                if binding.annotated_with == annotation {
                    joined.insert(entry_key.clone(), binding.clone());
                }
            }
        }
        joined
    }

    /// Resolution that must produce a value.
    pub(crate) fn resolve_required<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
        construct: Option<Ctor<T>>,
    ) -> Result<Shared<T>, Error> {
        match self.resolve_request::<T>(annotation, false, construct)? {
            Some(value) => Ok(value),
            None => Err(Error::unresolvable(TypeKey::of::<T>().name(), annotation)),
        }
    }

    /// `to` edge with on-demand construction of the target.
    pub(crate) fn resolve_edge_constructing<U: Construct>(&self) -> Result<Shared<U>, Error> {
        self.resolve_required::<U>("", Some(construct_hook::<U>))
    }

    /// `to` edge against an abstract target: lookup only.
    pub(crate) fn resolve_edge_lookup<U: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Shared<U>, Error> {
        self.resolve_required::<U>("", None)
    }

    /// Eager singleton materialization for one binding.
    pub(crate) fn resolve_for_eager<T: ?Sized + Send + Sync + 'static>(
        &self,
        annotation: &str,
    ) -> Result<(), Error> {
        self.resolve_required::<T>(annotation, None).map(|_| ())
    }

    /// Realizes a specific binding, falling back to a regular lookup when
    /// the binding has no terminal. Used by per-binding provider thunks.
    pub(crate) fn resolve_bound<T: ?Sized + Send + Sync + 'static>(
        &self,
        binding: &Binding,
        annotation: &str,
    ) -> Result<Shared<T>, Error> {
        match self.realize_binding::<T>(binding)? {
            Realization::Value(value) => Ok(value),
            Realization::Unbound => self.resolve_required::<T>(annotation, None),
        }
    }
}

/* ============================================================
 * Introspection snapshots
 * ============================================================
 */

impl Injector {
    pub(crate) fn snapshot_bindings(&self) -> Vec<(TypeKey, Binding)> {
        self.inner
            .bindings
            .read()
            .iter()
            .flat_map(|(typ, slots)| slots.iter().map(|slot| (*typ, slot.read().clone())))
            .collect()
    }

    pub(crate) fn snapshot_multibindings(&self) -> Vec<(TypeKey, usize, Binding)> {
        self.inner
            .multibindings
            .read()
            .iter()
            .flat_map(|(typ, slots)| {
                slots
                    .iter()
                    .enumerate()
                    .map(|(index, slot)| (*typ, index, slot.read().clone()))
            })
            .collect()
    }

    pub(crate) fn snapshot_mapbindings(&self) -> Vec<(TypeKey, String, Binding)> {
        self.inner
            .mapbindings
            .read()
            .iter()
            .flat_map(|(typ, entries)| {
                entries
                    .iter()
                    .map(|(key, slot)| (*typ, key.clone(), slot.read().clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_injector_binds_its_own_identity() {
        let injector = Injector::new(vec![]).unwrap();
        let bound = injector.get_instance::<Injector>().unwrap();
        assert!(Shared::ptr_eq(&bound.inner, &injector.inner));
    }

    #[test]
    fn test_child_sees_parent_bindings() {
        let injector = Injector::new(vec![]).unwrap();
        injector.bind::<String>().to_instance("parent".to_string());

        let child = injector.child();
        assert_eq!(*child.get_instance::<String>().unwrap(), "parent");
    }

    #[test]
    fn test_child_identity_is_its_own() {
        let injector = Injector::new(vec![]).unwrap();
        let child = injector.child();
        let bound = child.get_instance::<Injector>().unwrap();
        assert!(Shared::ptr_eq(&bound.inner, &child.inner));
        assert!(!Shared::ptr_eq(&bound.inner, &injector.inner));
    }

    #[test]
    fn test_unbound_type_is_unresolvable() {
        let injector = Injector::new(vec![]).unwrap();
        let err = injector.get_instance::<String>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unresolvable);
    }

    #[test]
    fn test_annotated_slots_are_distinct() {
        let injector = Injector::new(vec![]).unwrap();
        injector.bind::<String>().to_instance("plain".to_string());
        injector
            .bind::<String>()
            .annotated_with("loud")
            .to_instance("PLAIN".to_string());

        assert_eq!(*injector.get_instance::<String>().unwrap(), "plain");
        assert_eq!(
            *injector.get_annotated_instance::<String>("loud").unwrap(),
            "PLAIN"
        );
    }

    #[test]
    fn test_unknown_scope_is_reported() {
        struct UnregisteredScope;
        impl Scope for UnregisteredScope {
            fn resolve_type(
                &self,
                _key: TypeKey,
                _annotation: &str,
                unscoped: &dyn Fn() -> Result<Instance, Error>,
            ) -> Result<Instance, Error> {
                unscoped()
            }
        }

        let injector = Injector::new(vec![]).unwrap();
        injector
            .bind::<String>()
            .to_provider(|_| "value".to_string())
            .in_scope::<UnregisteredScope>();

        let err = injector.get_instance::<String>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownScope);
    }

    #[test]
    fn test_duplicate_bindings_are_rejected_at_init() {
        let injector = Injector::new(vec![]).unwrap();
        injector.bind::<String>().to_instance("a".to_string());
        injector.bind::<String>().to_instance("b".to_string());

        let err = injector.init_modules(vec![]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBinding);
    }

    #[test]
    fn test_self_referential_edge_is_rejected() {
        use crate::injectable::Realize;

        #[derive(Default, Debug)]
        struct SelfRef;
        impl Injectable for SelfRef {}
        crate::constructible!(SelfRef);
        impl Realize<SelfRef> for SelfRef {
            fn realize(this: Shared<Self>) -> Shared<SelfRef> {
                this
            }
        }

        let injector = Injector::new(vec![]).unwrap();
        injector.bind::<SelfRef>().to::<SelfRef>();

        let err = injector.get_instance::<SelfRef>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::SelfCycle);
    }

    #[test]
    fn test_override_of_unknown_binding_fails() {
        let injector = Injector::new(vec![]).unwrap();
        injector
            .override_binding::<String>("")
            .to_instance("c".to_string());

        let err = injector.init_modules(vec![]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownBinding);
    }
}
