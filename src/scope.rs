//! Scopes: memoization policies for resolved values.
//!
//! A [`Scope`] decides how often the unscoped creation runs. The container
//! ships two: [`SingletonScope`] memoizes process-wide per
//! `(type, annotation)`, and [`ChildSingletonScope`] has the same contract
//! but every child injector binds a fresh instance, so memoization is per
//! child.
//!
//! # Concurrent construction
//!
//! The singleton keeps a guard lock over per-key locks and a concurrent
//! instance table. The first requester of a key write-locks the key's own
//! lock and constructs outside every container lock, so different keys build
//! in parallel while the same key builds exactly once. Later requesters
//! read-lock, which blocks until the constructor publishes. A requester that
//! waits suspiciously long logs a stall diagnostic (a self-cycle through a
//! singleton is the usual cause) and keeps waiting; the diagnostic is
//! informational.

use std::collections::HashMap;
use std::time::Duration;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::warn;

use crate::error::{Error, ErrorKind};
use crate::instance::Instance;
use crate::key::TypeKey;
use crate::runtime::Shared;

/// How long a waiter blocks before the stall diagnostic fires.
const STALL_WARNING: Duration = Duration::from_secs(10);

/// A memoization policy for resolved values.
pub trait Scope: Send + Sync + 'static {
    /// Resolves `(key, annotation)` in this scope, calling `unscoped` when
    /// the scope decides a fresh value is needed.
    fn resolve_type(
        &self,
        key: TypeKey,
        annotation: &str,
        unscoped: &dyn Fn() -> Result<Instance, Error>,
    ) -> Result<Instance, Error>;
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct Ident {
    key: TypeKey,
    annotation: String,
}

/// Process-wide singleton memoization.
pub struct SingletonScope {
    instance_locks: Mutex<HashMap<Ident, Shared<RwLock<()>>>>,
    instances: DashMap<Ident, Instance>,
}

impl SingletonScope {
    pub fn new() -> Self {
        Self {
            instance_locks: Mutex::new(HashMap::new()),
            instances: DashMap::new(),
        }
    }

    /// Drops every memoized instance and per-key lock. Test isolation hook.
    pub fn reset(&self) {
        let mut locks = self.instance_locks.lock();
        locks.clear();
        self.instances.clear();
    }

    fn resolve(
        &self,
        key: TypeKey,
        annotation: &str,
        unscoped: &dyn Fn() -> Result<Instance, Error>,
    ) -> Result<Instance, Error> {
        let ident = Ident {
            key,
            annotation: annotation.to_string(),
        };

        let mut locks = self.instance_locks.lock();
        if let Some(lock) = locks.get(&ident).cloned() {
            drop(locks);

            let _read = match lock.try_read_for(STALL_WARNING) {
                Some(guard) => guard,
                None => {
                    warn!(
                        "Singleton: timed out waiting for instance lock: type: {:?}, annotation: {:?}",
                        key.name(),
                        annotation
                    );
                    lock.read()
                }
            };
            return self
                .instances
                .get(&ident)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::Unresolvable,
                        format!(
                            "singleton construction of {:?} (annotated with {:?}) failed",
                            key.name(),
                            annotation
                        ),
                    )
                });
        }

        let lock = Shared::new(RwLock::new(()));
        locks.insert(ident.clone(), lock.clone());
        let write = lock.write();
        drop(locks);

        // Construction runs outside every container lock so transitive
        // resolution of other keys can proceed.
        match unscoped() {
            Ok(instance) => {
                self.instances.insert(ident, instance.clone());
                drop(write);
                Ok(instance)
            }
            Err(err) => {
                self.instance_locks.lock().remove(&ident);
                drop(write);
                Err(err)
            }
        }
    }
}

impl Default for SingletonScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for SingletonScope {
    fn resolve_type(
        &self,
        key: TypeKey,
        annotation: &str,
        unscoped: &dyn Fn() -> Result<Instance, Error>,
    ) -> Result<Instance, Error> {
        self.resolve(key, annotation, unscoped)
    }
}

/// Per-child singleton memoization.
///
/// Same protocol as [`SingletonScope`]; each `Injector::child()` binds a
/// fresh instance, so memoized values are local to that child.
pub struct ChildSingletonScope(SingletonScope);

impl ChildSingletonScope {
    pub fn new() -> Self {
        Self(SingletonScope::new())
    }

    pub fn reset(&self) {
        self.0.reset();
    }
}

impl Default for ChildSingletonScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for ChildSingletonScope {
    fn resolve_type(
        &self,
        key: TypeKey,
        annotation: &str,
        unscoped: &dyn Fn() -> Result<Instance, Error>,
    ) -> Result<Instance, Error> {
        self.0.resolve(key, annotation, unscoped)
    }
}

static SINGLETON: Lazy<Shared<SingletonScope>> = Lazy::new(|| Shared::new(SingletonScope::new()));
static CHILD_SINGLETON: Lazy<Shared<ChildSingletonScope>> =
    Lazy::new(|| Shared::new(ChildSingletonScope::new()));

/// The process-wide default singleton scope.
pub fn singleton() -> Shared<SingletonScope> {
    SINGLETON.clone()
}

/// The default child-singleton scope bound to root injectors.
pub fn child_singleton() -> Shared<ChildSingletonScope> {
    CHILD_SINGLETON.clone()
}

/// Clears the process-wide default scopes. Test isolation hook.
pub fn reset_scopes() {
    SINGLETON.reset();
    CHILD_SINGLETON.reset();
}
