//! Macros for wiring records into the container.
//!
//! - [`constructible!`]: derives [`Construct`](crate::Construct) for
//!   `Default` types as zero-value-then-inject.
//! - [`inject_field!`]: one statement per injected field inside an
//!   [`Injectable::inject`](crate::Injectable::inject) body, wrapping errors
//!   with the record and field they occurred in.
//!
//! # Example
//!
//! ```
//! use bindery::{constructible, inject_field, Error, Injectable, Injector, Provider, Shared};
//!
//! trait Processor: Send + Sync {
//!     fn process(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct Checkout {
//!     processor: Option<Shared<dyn Processor>>,
//!     label: String,
//!     backup: Provider<dyn Processor>,
//! }
//!
//! impl Injectable for Checkout {
//!     fn inject(&mut self, injector: &Injector) -> Result<(), Error> {
//!         inject_field!(injector, self.processor, shared dyn Processor);
//!         inject_field!(injector, self.label, optional value String, "label");
//!         inject_field!(injector, self.backup, provider dyn Processor, "backup");
//!         Ok(())
//!     }
//! }
//! constructible!(Checkout);
//! ```

/// Derives [`Construct`](crate::Construct) as zero value plus injection.
///
/// Requires `Default` and an [`Injectable`](crate::Injectable) impl.
#[macro_export]
macro_rules! constructible {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Construct for $ty {
            fn construct(injector: &$crate::Injector) -> ::std::result::Result<Self, $crate::Error> {
                let mut value = <$ty as ::std::default::Default>::default();
                $crate::Injectable::inject(&mut value, injector)?;
                ::std::result::Result::Ok(value)
            }
        }
    )+};
}

/// Resolves one dependency into a field of `self`.
///
/// Field kinds and the field types they expect:
///
/// | kind | field type |
/// |---|---|
/// | `shared Ty` | `Option<Shared<Ty>>` |
/// | `value Ty` | `Ty` (cloned out of the shared value) |
/// | `optional shared Ty` / `optional value Ty` | as above; absent bindings leave the field alone |
/// | `provider Ty` / `create_provider Ty` | `Provider<Ty>` |
/// | `multi Ty` | `Vec<Shared<Ty>>` |
/// | `map Ty` | `HashMap<String, Shared<Ty>>` |
/// | `provider_list Ty` | `Vec<Provider<Ty>>` |
/// | `provider_map Ty` | `HashMap<String, Provider<Ty>>` |
/// | `multi_provider Ty` | `MultiProvider<Ty>` |
/// | `map_provider Ty` | `MapProvider<Ty>` |
///
/// Every kind takes an optional trailing annotation; a `map:key` annotation
/// addresses a single map-binding entry.
#[macro_export]
macro_rules! inject_field {
    (@ann) => {
        ""
    };
    (@ann $ann:expr) => {
        $ann
    };
    (@wrap $s:ident, $f:ident, $result:expr) => {
        $result.map_err(|err| {
            err.while_injecting(::std::any::type_name_of_val(&*$s), stringify!($f))
        })?
    };
    ($inj:expr, $s:ident.$f:ident, shared $ty:ty $(, $ann:expr)?) => {
        $s.$f = ::std::option::Option::Some($crate::inject_field!(@wrap $s, $f,
            $inj.get_annotated_instance::<$ty>($crate::inject_field!(@ann $($ann)?))));
    };
    ($inj:expr, $s:ident.$f:ident, value $ty:ty $(, $ann:expr)?) => {
        $s.$f = (*$crate::inject_field!(@wrap $s, $f,
            $inj.get_annotated_instance::<$ty>($crate::inject_field!(@ann $($ann)?))))
            .clone();
    };
    ($inj:expr, $s:ident.$f:ident, optional shared $ty:ty $(, $ann:expr)?) => {
        $s.$f = $crate::inject_field!(@wrap $s, $f,
            $inj.get_optional::<$ty>($crate::inject_field!(@ann $($ann)?)));
    };
    ($inj:expr, $s:ident.$f:ident, optional value $ty:ty $(, $ann:expr)?) => {
        if let ::std::option::Option::Some(value) = $crate::inject_field!(@wrap $s, $f,
            $inj.get_optional::<$ty>($crate::inject_field!(@ann $($ann)?)))
        {
            $s.$f = (*value).clone();
        }
    };
    ($inj:expr, $s:ident.$f:ident, provider $ty:ty $(, $ann:expr)?) => {
        $s.$f = $inj.provider_of::<$ty>($crate::inject_field!(@ann $($ann)?));
    };
    ($inj:expr, $s:ident.$f:ident, create_provider $ty:ty $(, $ann:expr)?) => {
        $s.$f = $inj.create_provider_of::<$ty>($crate::inject_field!(@ann $($ann)?));
    };
    ($inj:expr, $s:ident.$f:ident, multi $ty:ty $(, $ann:expr)?) => {
        $s.$f = $crate::inject_field!(@wrap $s, $f,
            $inj.get_annotated_all::<$ty>($crate::inject_field!(@ann $($ann)?)));
    };
    ($inj:expr, $s:ident.$f:ident, map $ty:ty $(, $ann:expr)?) => {
        $s.$f = $crate::inject_field!(@wrap $s, $f,
            $inj.get_annotated_map::<$ty>($crate::inject_field!(@ann $($ann)?)));
    };
    ($inj:expr, $s:ident.$f:ident, provider_list $ty:ty $(, $ann:expr)?) => {
        $s.$f = $inj.get_all_providers::<$ty>($crate::inject_field!(@ann $($ann)?));
    };
    ($inj:expr, $s:ident.$f:ident, provider_map $ty:ty $(, $ann:expr)?) => {
        $s.$f = $inj.get_map_providers::<$ty>($crate::inject_field!(@ann $($ann)?));
    };
    ($inj:expr, $s:ident.$f:ident, multi_provider $ty:ty $(, $ann:expr)?) => {
        $s.$f = $inj.multi_provider_of::<$ty>($crate::inject_field!(@ann $($ann)?));
    };
    ($inj:expr, $s:ident.$f:ident, map_provider $ty:ty $(, $ann:expr)?) => {
        $s.$f = $inj.map_provider_of::<$ty>($crate::inject_field!(@ann $($ann)?));
    };
}
