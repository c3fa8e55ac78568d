use bindery::{
    constructible, inject_field, Error, Injectable, Injector, Module, Provider, Realize, Shared,
    Store,
};

trait TestInterface: Send + Sync {
    fn test(&self) -> i32;
    fn foo(&self) -> &str {
        ""
    }
}

trait InterfaceSub: TestInterface {}

#[derive(Default)]
struct InterfaceImpl1 {
    foo: String,
}

impl TestInterface for InterfaceImpl1 {
    fn test(&self) -> i32 {
        1
    }
    fn foo(&self) -> &str {
        &self.foo
    }
}
impl InterfaceSub for InterfaceImpl1 {}
impl Injectable for InterfaceImpl1 {}
constructible!(InterfaceImpl1);
impl Realize<dyn InterfaceSub> for InterfaceImpl1 {
    fn realize(this: Shared<Self>) -> Shared<dyn InterfaceSub> {
        this
    }
}
impl Realize<dyn TestInterface> for InterfaceImpl1 {
    fn realize(this: Shared<Self>) -> Shared<dyn TestInterface> {
        this
    }
}

#[derive(Default)]
struct InterfaceImpl2;

impl TestInterface for InterfaceImpl2 {
    fn test(&self) -> i32 {
        2
    }
}
impl Injectable for InterfaceImpl2 {}
constructible!(InterfaceImpl2);
impl Realize<dyn TestInterface> for InterfaceImpl2 {
    fn realize(this: Shared<Self>) -> Shared<dyn TestInterface> {
        this
    }
}

impl Realize<dyn TestInterface> for dyn InterfaceSub {
    fn realize(this: Shared<dyn InterfaceSub>) -> Shared<dyn TestInterface> {
        this
    }
}

struct PreTestModule;

impl Module for PreTestModule {
    fn configure(&self, injector: &Injector) {
        injector
            .bind::<String>()
            .to_instance("Hello World".to_string());
    }
}

struct TestModule;

impl Module for TestModule {
    fn configure(&self, injector: &Injector) {
        injector
            .bind::<dyn TestInterface>()
            .to_abstract::<dyn InterfaceSub>();
        injector.bind::<dyn InterfaceSub>().to::<InterfaceImpl1>();
        injector
            .bind::<dyn TestInterface>()
            .annotated_with("test")
            .to::<InterfaceImpl2>();

        injector
            .bind::<dyn TestInterface>()
            .annotated_with("provider")
            .to_provider(|injector: &Injector| -> Shared<dyn TestInterface> {
                let greeting = injector.get_instance::<String>().unwrap();
                Shared::new(InterfaceImpl1 {
                    foo: (*greeting).clone(),
                })
            });
        injector
            .bind::<dyn TestInterface>()
            .annotated_with("instance")
            .to_instance(Shared::new(InterfaceImpl2) as Shared<dyn TestInterface>);
    }
}

#[derive(Default)]
struct DepTest {
    iface: Option<Shared<dyn TestInterface>>,
    iface2: Option<Shared<dyn TestInterface>>,
    iface_provider: Provider<dyn TestInterface>,
    iface_provided: Option<Shared<dyn TestInterface>>,
    iface_instance: Option<Shared<dyn TestInterface>>,
}

impl Injectable for DepTest {
    fn inject(&mut self, injector: &Injector) -> Result<(), Error> {
        inject_field!(injector, self.iface, shared dyn TestInterface);
        inject_field!(injector, self.iface2, shared dyn TestInterface, "test");
        inject_field!(injector, self.iface_provider, provider dyn TestInterface);
        inject_field!(injector, self.iface_provided, shared dyn TestInterface, "provider");
        inject_field!(injector, self.iface_instance, shared dyn TestInterface, "instance");
        Ok(())
    }
}
constructible!(DepTest);

fn test_injector() -> Injector {
    Injector::new(vec![Box::new(PreTestModule), Box::new(TestModule)]).unwrap()
}

#[test]
fn resolves_dependencies_on_request() {
    let injector = test_injector();

    let iface = injector.get_instance::<dyn TestInterface>().unwrap();
    assert_eq!(iface.test(), 1);

    let dt = injector.create_instance::<DepTest>().unwrap();
    assert_eq!(dt.iface.as_ref().unwrap().test(), 1);
    assert_eq!(dt.iface2.as_ref().unwrap().test(), 2);
    assert_eq!(dt.iface_provided.as_ref().unwrap().test(), 1);
    assert_eq!(dt.iface_instance.as_ref().unwrap().test(), 2);

    // provider resolves at call time, in both call shapes
    assert_eq!(dt.iface_provider.get().test(), 1);
    let via_error_shape = dt.iface_provider.try_get().unwrap();
    assert_eq!(via_error_shape.test(), 1);

    // values produced by the bound factory carry the injected greeting
    assert_eq!(dt.iface_provided.as_ref().unwrap().foo(), "Hello World");
}

#[test]
fn injects_into_existing_values() {
    let injector = test_injector();

    let dt = Shared::new(Store::new(DepTest::default()));
    injector.request_injection(&dt).unwrap();

    let dt = dt.read();
    assert_eq!(dt.iface.as_ref().unwrap().test(), 1);
    assert_eq!(dt.iface2.as_ref().unwrap().test(), 2);
}

#[test]
fn overrides_replace_the_targeted_binding() {
    let injector = Injector::new(vec![]).unwrap();
    injector.bind::<String>().to_instance("test".to_string());
    injector.bind::<String>().to_instance("test-bla".to_string());
    injector
        .override_binding::<String>("")
        .to_instance("test2".to_string());
    injector.init_modules(vec![]).unwrap();

    assert_eq!(*injector.get_instance::<String>().unwrap(), "test2");
}

#[test]
fn overrides_respect_annotations() {
    let injector = Injector::new(vec![]).unwrap();
    injector
        .bind::<String>()
        .annotated_with("test")
        .to_instance("test".to_string());
    injector
        .bind::<String>()
        .annotated_with("other")
        .to_instance("untouched".to_string());
    injector
        .override_binding::<String>("test")
        .to_instance("test2".to_string());
    injector.init_modules(vec![]).unwrap();

    assert_eq!(
        *injector.get_annotated_instance::<String>("test").unwrap(),
        "test2"
    );
    assert_eq!(
        *injector.get_annotated_instance::<String>("other").unwrap(),
        "untouched"
    );
}

#[derive(Default)]
struct OptionalDeps {
    must: String,
    optional: String,
}

impl Injectable for OptionalDeps {
    fn inject(&mut self, injector: &Injector) -> Result<(), Error> {
        inject_field!(injector, self.must, value String, "must");
        inject_field!(injector, self.optional, optional value String, "option");
        Ok(())
    }
}
constructible!(OptionalDeps);

#[test]
fn optional_slots_tolerate_missing_bindings() {
    let injector = Injector::new(vec![]).unwrap();

    // the required slot has nothing bound yet
    assert!(injector.create_instance::<OptionalDeps>().is_err());

    injector
        .bind::<String>()
        .annotated_with("must")
        .to_instance("must".to_string());
    let deps = injector.create_instance::<OptionalDeps>().unwrap();
    assert_eq!(deps.must, "must");
    assert_eq!(deps.optional, "");

    injector
        .bind::<String>()
        .annotated_with("option")
        .to_instance("option".to_string());
    let deps = injector.create_instance::<OptionalDeps>().unwrap();
    assert_eq!(deps.must, "must");
    assert_eq!(deps.optional, "option");
}

#[derive(Default)]
struct BoundNothing;
impl Injectable for BoundNothing {}
constructible!(BoundNothing);

#[test]
fn annotated_binding_without_terminal_constructs_the_declared_type() {
    let injector = Injector::new(vec![]).unwrap();
    injector.bind::<BoundNothing>().annotated_with("test");

    let provider = injector.create_provider_of::<BoundNothing>("");
    assert!(provider.try_get().is_ok());
}

trait ChildIface: Send + Sync {
    fn live(&self) -> bool;
}

trait ChildParentIface: Send + Sync {
    fn child(&self) -> Shared<dyn ChildIface>;
}

#[derive(Default)]
struct ChildIfaceImpl;
impl ChildIface for ChildIfaceImpl {
    fn live(&self) -> bool {
        true
    }
}
impl Injectable for ChildIfaceImpl {}
constructible!(ChildIfaceImpl);
impl Realize<dyn ChildIface> for ChildIfaceImpl {
    fn realize(this: Shared<Self>) -> Shared<dyn ChildIface> {
        this
    }
}

#[derive(Default)]
struct ChildParentImpl {
    child_provider: Provider<dyn ChildIface>,
}

impl ChildParentIface for ChildParentImpl {
    fn child(&self) -> Shared<dyn ChildIface> {
        self.child_provider.get()
    }
}
impl Injectable for ChildParentImpl {
    fn inject(&mut self, injector: &Injector) -> Result<(), Error> {
        inject_field!(injector, self.child_provider, provider dyn ChildIface);
        Ok(())
    }
}
constructible!(ChildParentImpl);
impl Realize<dyn ChildParentIface> for ChildParentImpl {
    fn realize(this: Shared<Self>) -> Shared<dyn ChildParentIface> {
        this
    }
}

#[test]
fn child_bindings_resolve_through_parent_declarations() {
    let injector = Injector::new(vec![]).unwrap();
    injector
        .bind::<dyn ChildParentIface>()
        .to::<ChildParentImpl>();

    let child = injector.child();
    child.bind::<dyn ChildIface>().to::<ChildIfaceImpl>();

    // the parent can build the outer value; its lazy child edge stays lazy
    assert!(injector.get_instance::<dyn ChildParentIface>().is_ok());

    // resolved via the child, the lazy edge finds the child's binding
    let via_child = child.get_instance::<dyn ChildParentIface>().unwrap();
    assert!(via_child.child().live());
}
