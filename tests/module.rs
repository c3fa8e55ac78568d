use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bindery::{
    constructible, try_module, Error, ErrorKind, Injectable, Injector, Module, ModuleFunc, Shared,
    Store,
};
use parking_lot::Mutex;

static CONFIGURED: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

struct ModuleA;
struct ModuleB;
struct ModuleB2;
struct ModuleC;

impl Module for ModuleA {
    fn depends(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(ModuleA), Box::new(ModuleB), Box::new(ModuleB2)]
    }
    fn configure(&self, _injector: &Injector) {
        CONFIGURED.lock().push("A");
    }
}

impl Module for ModuleB {
    fn depends(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(ModuleC), Box::new(ModuleB2)]
    }
    fn configure(&self, _injector: &Injector) {
        CONFIGURED.lock().push("B");
    }
}

impl Module for ModuleB2 {
    fn configure(&self, _injector: &Injector) {
        CONFIGURED.lock().push("B2");
    }
}

impl Module for ModuleC {
    fn configure(&self, _injector: &Injector) {
        CONFIGURED.lock().push("C");
    }
}

#[test]
fn modules_configure_dependencies_first_and_once() {
    CONFIGURED.lock().clear();
    Injector::new(vec![Box::new(ModuleA)]).unwrap();
    assert_eq!(*CONFIGURED.lock(), vec!["C", "B2", "B", "A"]);
}

#[test]
fn module_funcs_deduplicate_by_value_identity() {
    let inline = Arc::new(AtomicUsize::new(0));
    let external = Arc::new(AtomicUsize::new(0));

    let shared_fn = {
        let external = external.clone();
        move |_injector: &Injector| {
            external.fetch_add(1, Ordering::SeqCst);
        }
    };

    let inline_a = inline.clone();
    let inline_b = inline.clone();
    Injector::new(vec![
        Box::new(ModuleFunc::new(move |_injector: &Injector| {
            inline_a.fetch_add(1, Ordering::SeqCst);
        })),
        Box::new(ModuleFunc::new(move |_injector: &Injector| {
            inline_b.fetch_add(1, Ordering::SeqCst);
        })),
        Box::new(ModuleFunc::new(shared_fn.clone())),
        Box::new(ModuleFunc::new(shared_fn)),
    ])
    .unwrap();

    assert_eq!(inline.load(Ordering::SeqCst), 2);
    assert_eq!(external.load(Ordering::SeqCst), 1);
}

#[test]
fn try_module_accepts_sound_modules() {
    struct Sound;
    impl Module for Sound {
        fn configure(&self, injector: &Injector) {
            injector.bind::<String>().to_instance("test".to_string());
        }
    }
    assert!(try_module(vec![Box::new(Sound)]).is_ok());
}

#[test]
fn try_module_surfaces_registration_errors() {
    struct Failing;
    impl Module for Failing {
        fn configure(&self, injector: &Injector) {
            injector
                .override_binding::<String>("missing")
                .to_instance("value".to_string());
        }
    }
    let err = try_module(vec![Box::new(Failing)]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownBinding);
}

#[test]
fn try_module_traps_panics() {
    struct Panicking;
    impl Module for Panicking {
        fn configure(&self, injector: &Injector) {
            // annotating a map binding is a registration-time panic
            injector
                .bind_map::<String>("key")
                .annotated_with("not allowed");
        }
    }
    let err = try_module(vec![Box::new(Panicking)]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ModulePanic);
}

#[derive(Default)]
struct LateInjected {
    greeting: String,
}

impl Injectable for LateInjected {
    fn inject(&mut self, injector: &Injector) -> Result<(), Error> {
        self.greeting = (*injector.get_instance::<String>()?).clone();
        Ok(())
    }
}
constructible!(LateInjected);

#[test]
fn injection_requests_during_init_are_deferred() {
    let target: Shared<Store<LateInjected>> = Shared::new(Store::new(LateInjected::default()));

    let handle = target.clone();
    let injector = Injector::new(vec![Box::new(ModuleFunc::new(
        move |injector: &Injector| {
            // requested before the greeting is bound; must not resolve yet
            injector.request_injection(&handle).unwrap();
            injector
                .bind::<String>()
                .to_instance("configured".to_string());
        },
    ))])
    .unwrap();
    let _ = injector;

    assert_eq!(target.read().greeting, "configured");
}

#[test]
fn injection_requests_after_init_run_immediately() {
    let injector = Injector::new(vec![]).unwrap();
    injector
        .bind::<String>()
        .to_instance("immediate".to_string());

    let target: Shared<Store<LateInjected>> = Shared::new(Store::new(LateInjected::default()));
    injector.request_injection(&target).unwrap();
    assert_eq!(target.read().greeting, "immediate");
}
