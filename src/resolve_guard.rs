//! Thread-local resolution trace for circular dependency detection.
//!
//! Tracing is off by default; recursion then relies on lazy providers to
//! break cycles, and an unbroken cycle overflows the stack. When enabled via
//! [`enable_circular_tracing`], every on-demand construction pushes its
//! `(type, annotation)` onto a thread-local stack. A repeated entry dumps the
//! chain through `tracing` and aborts with a circular-dependency panic, which
//! [`try_module`](crate::try_module) converts back into an error.
//!
//! Provider thunks detach the stack for the duration of their invocation:
//! the thunk was created on some resolution path, but it runs on a path of
//! its own, which is what lets a cycle through a provider edge resolve.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::Error;
use crate::key::TypeKey;

static CIRCULAR_TRACING: AtomicBool = AtomicBool::new(false);
static INJECTION_TRACING: AtomicBool = AtomicBool::new(false);

/// Activates the circular dependency tracer.
///
/// Expensive, process-wide, and intended for debugging only.
pub fn enable_circular_tracing() {
    CIRCULAR_TRACING.store(true, Ordering::SeqCst);
}

/// Activates per-construction debug logging.
///
/// Process-wide; intended for debugging only.
pub fn enable_injection_tracing() {
    INJECTION_TRACING.store(true, Ordering::SeqCst);
}

pub(crate) fn circular_tracing_enabled() -> bool {
    CIRCULAR_TRACING.load(Ordering::SeqCst)
}

pub(crate) fn injection_tracing_enabled() -> bool {
    INJECTION_TRACING.load(Ordering::SeqCst)
}

#[derive(Clone, PartialEq)]
struct TraceEntry {
    key: TypeKey,
    annotation: String,
}

thread_local! {
    // Chain of on-demand constructions running on this thread.
    static RESOLVE_STACK: RefCell<Vec<TraceEntry>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops its trace entry when the construction finishes.
pub(crate) struct ResolveGuard {
    pushed: bool,
}

impl ResolveGuard {
    /// Records that a `(type, annotation)` construction starts.
    ///
    /// No-op while circular tracing is disabled. Panics with a
    /// circular-dependency message when the entry is already on the stack,
    /// after logging the full chain.
    pub(crate) fn enter(key: TypeKey, annotation: &str) -> Self {
        if injection_tracing_enabled() {
            debug!("INJECTING: {} {:?}", key, annotation);
        }
        if !circular_tracing_enabled() {
            return Self { pushed: false };
        }

        let entry = TraceEntry {
            key,
            annotation: annotation.to_string(),
        };
        RESOLVE_STACK.with(|stack| {
            let mut chain = stack.borrow_mut();
            if chain.contains(&entry) {
                let mut names: Vec<String> = chain
                    .iter()
                    .map(|e| format!("{}#{}", e.key, e.annotation))
                    .collect();
                names.push(format!("{}#{}", entry.key, entry.annotation));
                for name in &names {
                    debug!("{}", name);
                }
                drop(chain);
                panic!("{}", Error::circular_dependency(&names).message);
            }
            chain.push(entry);
        });
        Self { pushed: true }
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        if self.pushed {
            RESOLVE_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
}

/// Guard that empties the trace for a provider thunk invocation and restores
/// the previous chain afterwards.
pub(crate) struct DetachedTrace {
    saved: Vec<TraceEntry>,
}

impl DetachedTrace {
    pub(crate) fn begin() -> Self {
        let saved = RESOLVE_STACK.with(|stack| std::mem::take(&mut *stack.borrow_mut()));
        Self { saved }
    }
}

impl Drop for DetachedTrace {
    fn drop(&mut self) {
        let saved = std::mem::take(&mut self.saved);
        RESOLVE_STACK.with(|stack| *stack.borrow_mut() = saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_stack_pushes_and_pops() {
        enable_circular_tracing();

        let a = TypeKey::of::<u8>();
        let b = TypeKey::of::<u16>();
        {
            let _g1 = ResolveGuard::enter(a, "");
            {
                let _g2 = ResolveGuard::enter(b, "");
            }
            // b popped; entering it again is fine
            let _g3 = ResolveGuard::enter(b, "");
        }
        // everything popped; a can re-enter
        let _g = ResolveGuard::enter(a, "");
    }

    #[test]
    fn annotations_discriminate_entries() {
        enable_circular_tracing();

        let key = TypeKey::of::<u32>();
        let _plain = ResolveGuard::enter(key, "");
        let _annotated = ResolveGuard::enter(key, "other");
    }

    #[test]
    #[should_panic(expected = "circular dependency")]
    fn repeated_entry_panics() {
        enable_circular_tracing();

        let key = TypeKey::of::<u64>();
        let _g1 = ResolveGuard::enter(key, "");
        let _g2 = ResolveGuard::enter(key, "");
    }

    #[test]
    fn detached_trace_allows_reentry() {
        enable_circular_tracing();

        let key = TypeKey::of::<i64>();
        let _g1 = ResolveGuard::enter(key, "");
        {
            let _detached = DetachedTrace::begin();
            // fresh chain: the same key may enter again
            let _g2 = ResolveGuard::enter(key, "");
        }
        // restored chain still holds the key
        let caught = std::panic::catch_unwind(|| {
            let _g = ResolveGuard::enter(key, "");
        });
        assert!(caught.is_err());
    }
}
