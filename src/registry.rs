//! The function registry.
//!
//! A [`Registry`] maps pairs of a [`Function`] and a mapped type to implementations, plus one
//! optional default implementation per function. It is assembled with a [`RegistryBuilder`] and
//! immutable afterwards, so it can be shared between threads without locking.
//!
//! The methods of [`Boxed`] that invoke functions use the process-wide registry returned by
//! [`Registry::global`]. It is bootstrapped with the built-in implementations on first use,
//! unless a custom registry was [installed](Registry::install) before.

use std::any::{Any, TypeId};
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::bootstrap;
use crate::boxed::Boxed;
use crate::descriptor::{MappedType, TypeDescriptor};
use crate::error::BoxingError;
use crate::function::{Function, Reach};

static GLOBAL_REGISTRY: OnceCell<Registry> = OnceCell::new();

struct Registration {
    function: &'static str,
    implementation: Box<dyn Any + Send + Sync>,
}

impl Registration {
    fn new<F: Function>(implementation: F::Signature) -> Self {
        Registration {
            function: F::NAME,
            implementation: Box::new(implementation),
        }
    }

    fn get<F: Function>(&self) -> Option<F::Signature> {
        self.implementation.downcast_ref::<F::Signature>().copied()
    }
}

/// Implementations of functions for mapped types.
#[derive(Default)]
pub struct Registry {
    types: HashMap<TypeId, &'static TypeDescriptor>,
    defaults: HashMap<TypeId, Registration>,
    functions: HashMap<(TypeId, TypeId), Registration>,
}

/// Assembles a [`Registry`].
///
/// Registering the same function twice for one mapped type, or registering two defaults for one
/// function, is rejected and leaves the first registration in place.
///
/// # Example
///
/// ```
/// use std::fmt;
///
/// use polybox::{Append, Boxed, RegistryBuilder};
///
/// fn append_flag(boxed: &Boxed<'_>, target: &mut dyn fmt::Write) -> fmt::Result {
///     target.write_str(if boxed.unbox::<bool>() { "yes" } else { "no" })
/// }
///
/// let mut builder = RegistryBuilder::new();
/// builder.register::<Append, bool>(append_flag).unwrap();
/// assert!(builder.register::<Append, bool>(append_flag).is_err());
///
/// builder.register_builtins();
/// let registry = builder.build();
///
/// let boxed = Boxed::new(true);
/// let mut text = String::new();
/// registry
///     .try_call::<Append, _>(&boxed, |append| append(&boxed, &mut text))
///     .unwrap()
///     .unwrap();
/// assert_eq!(text, "yes");
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Creates a builder without any registrations.
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Creates a builder holding the built-in implementations.
    pub fn with_builtins() -> Self {
        let mut builder = RegistryBuilder::new();
        builder.register_builtins();
        builder
    }

    /// Adds the built-in implementations.
    ///
    /// Registrations made before keep precedence over the built-in ones.
    pub fn register_builtins(&mut self) -> &mut Self {
        bootstrap::register_builtins(self);
        self
    }

    /// Registers the implementation of `F` for the mapped type `M`.
    pub fn register<F: Function, M: MappedType + ?Sized>(
        &mut self,
        implementation: F::Signature,
    ) -> Result<&mut Self, BoxingError> {
        if let Err(err) = self.insert::<F, M>(implementation) {
            warn!(target: "polybox", "{err}");
            return Err(err);
        }
        Ok(self)
    }

    /// Registers the default implementation of `F`.
    pub fn register_default<F: Function>(
        &mut self,
        implementation: F::Signature,
    ) -> Result<&mut Self, BoxingError> {
        if let Err(err) = self.insert_default::<F>(implementation) {
            warn!(target: "polybox", "{err}");
            return Err(err);
        }
        Ok(self)
    }

    /// Makes `M` known to the registry without registering a function for it.
    ///
    /// Known types are listed by [`Registry::descriptors`].
    pub fn register_type<M: MappedType + ?Sized>(&mut self) -> &mut Self {
        let descriptor: &'static TypeDescriptor = &M::DESCRIPTOR;
        self.registry
            .types
            .insert(descriptor.type_id(), descriptor);
        self
    }

    /// Registers `implementation` unless `F` is already implemented for `M`.
    pub(crate) fn provide<F: Function, M: MappedType + ?Sized>(
        &mut self,
        implementation: F::Signature,
    ) -> &mut Self {
        if let Err(err) = self.insert::<F, M>(implementation) {
            debug!(target: "polybox", "{err}, keeping it");
        }
        self
    }

    /// Registers `implementation` as default unless `F` already has one.
    pub(crate) fn provide_default<F: Function>(&mut self, implementation: F::Signature) -> &mut Self {
        if let Err(err) = self.insert_default::<F>(implementation) {
            debug!(target: "polybox", "{err}, keeping it");
        }
        self
    }

    fn insert<F: Function, M: MappedType + ?Sized>(
        &mut self,
        implementation: F::Signature,
    ) -> Result<(), BoxingError> {
        let descriptor: &'static TypeDescriptor = &M::DESCRIPTOR;
        match self
            .registry
            .functions
            .entry((TypeId::of::<F>(), descriptor.type_id()))
        {
            hash_map::Entry::Occupied(_) => Err(BoxingError::DuplicateRegistration {
                function: F::NAME,
                mapped: descriptor.type_name(),
            }),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(Registration::new::<F>(implementation));
                self.registry
                    .types
                    .insert(descriptor.type_id(), descriptor);
                debug!(
                    target: "polybox",
                    function = F::NAME,
                    mapped = descriptor.type_name(),
                    "registered function"
                );
                Ok(())
            }
        }
    }

    fn insert_default<F: Function>(&mut self, implementation: F::Signature) -> Result<(), BoxingError> {
        match self.registry.defaults.entry(TypeId::of::<F>()) {
            hash_map::Entry::Occupied(_) => Err(BoxingError::DuplicateDefault { function: F::NAME }),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(Registration::new::<F>(implementation));
                debug!(target: "polybox", function = F::NAME, "registered default function");
                Ok(())
            }
        }
    }

    /// Freezes the registrations.
    pub fn build(self) -> Registry {
        self.registry
    }
}

impl Registry {
    /// A registry holding the built-in implementations only.
    pub fn bootstrap() -> Self {
        RegistryBuilder::with_builtins().build()
    }

    /// The process-wide registry.
    ///
    /// Bootstraps it with the built-in implementations if none was installed.
    pub fn global() -> &'static Registry {
        GLOBAL_REGISTRY.get_or_init(|| {
            debug!(target: "polybox", "bootstrapping global registry");
            Registry::bootstrap()
        })
    }

    /// Installs `self` as the process-wide registry.
    ///
    /// Fails if a registry was installed already, or if [`Registry::global`] was called before.
    pub fn install(self) -> Result<(), BoxingError> {
        match GLOBAL_REGISTRY.set(self) {
            Ok(()) => {
                debug!(target: "polybox", "installed global registry");
                Ok(())
            }
            Err(_) => {
                warn!(target: "polybox", "{}", BoxingError::AlreadyInstalled);
                Err(BoxingError::AlreadyInstalled)
            }
        }
    }

    /// Looks up the implementation of `F` for the mapped type `descriptor`.
    pub fn get_function<F: Function>(
        &self,
        descriptor: &TypeDescriptor,
        reach: Reach,
    ) -> Option<F::Signature> {
        let local = self
            .functions
            .get(&(TypeId::of::<F>(), descriptor.type_id()))
            .and_then(Registration::get::<F>);
        match reach {
            Reach::Local => local,
            Reach::Global => local.or_else(|| self.default_function::<F>()),
        }
    }

    /// The default implementation of `F`.
    pub fn default_function<F: Function>(&self) -> Option<F::Signature> {
        self.defaults
            .get(&TypeId::of::<F>())
            .and_then(Registration::get::<F>)
    }

    /// Invokes `F` for `boxed`.
    ///
    /// `invoke` receives the implementation and passes the arguments to it. If neither the
    /// mapped type nor the defaults implement `F`, a warning is logged and `R::default()` is
    /// returned.
    pub fn call<F: Function, R: Default>(
        &self,
        boxed: &Boxed<'_>,
        invoke: impl FnOnce(F::Signature) -> R,
    ) -> R {
        match self.try_call::<F, R>(boxed, invoke) {
            Ok(result) => result,
            Err(err) => {
                warn!(target: "polybox", "{err}");
                R::default()
            }
        }
    }

    /// Invokes `F` for `boxed`, failing if there is no implementation.
    pub fn try_call<F: Function, R>(
        &self,
        boxed: &Boxed<'_>,
        invoke: impl FnOnce(F::Signature) -> R,
    ) -> Result<R, BoxingError> {
        self.get_function::<F>(boxed.descriptor(), Reach::Global)
            .map(invoke)
            .ok_or_else(|| BoxingError::NotImplemented {
                function: F::NAME,
                mapped: boxed.type_name(),
            })
    }

    /// Descriptors of all types with registrations, sorted by name.
    pub fn descriptors(&self) -> Vec<&'static TypeDescriptor> {
        let mut descriptors: Vec<_> = self.types.values().copied().collect();
        descriptors.sort_by_key(|descriptor| descriptor.type_name());
        descriptors
    }

    /// Names of the functions implemented for `descriptor`, sorted.
    pub fn functions_of(&self, descriptor: &TypeDescriptor) -> Vec<&'static str> {
        let mapped = descriptor.type_id();
        let mut names: Vec<_> = self
            .functions
            .iter()
            .filter(|((_, ty), _)| *ty == mapped)
            .map(|(_, registration)| registration.function)
            .collect();
        names.sort_unstable();
        names
    }

    /// Names of the functions with a default implementation, sorted.
    pub fn default_functions(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .defaults
            .values()
            .map(|registration| registration.function)
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.len())
            .field("defaults", &self.default_functions())
            .field("functions", &self.functions.len())
            .finish()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegistryBuilder").field(&self.registry).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Equals, IsTrue};

    fn never_equal(_: &Boxed<'_>, _: &Boxed<'_>) -> bool {
        false
    }

    fn always_equal(_: &Boxed<'_>, _: &Boxed<'_>) -> bool {
        true
    }

    fn is_true(_: &Boxed<'_>) -> bool {
        true
    }

    #[test]
    fn test_duplicate_registration() {
        let mut builder = RegistryBuilder::new();
        builder.register::<Equals, i64>(never_equal).unwrap();
        assert_eq!(
            builder.register::<Equals, i64>(always_equal).unwrap_err(),
            BoxingError::DuplicateRegistration {
                function: "Equals",
                mapped: "i64"
            }
        );

        let registry = builder.build();
        let boxed = Boxed::new(1i64);
        let equals = registry
            .get_function::<Equals>(boxed.descriptor(), Reach::Local)
            .unwrap();
        assert!(!equals(&boxed, &boxed));
    }

    #[test]
    fn test_duplicate_default() {
        let mut builder = RegistryBuilder::new();
        builder.register_default::<IsTrue>(is_true).unwrap();
        assert_eq!(
            builder.register_default::<IsTrue>(is_true).unwrap_err(),
            BoxingError::DuplicateDefault { function: "IsTrue" }
        );
    }

    #[test]
    fn test_reach() {
        let mut builder = RegistryBuilder::new();
        builder.register_default::<Equals>(always_equal).unwrap();
        let registry = builder.build();

        let boxed = Boxed::new('c');
        assert!(registry
            .get_function::<Equals>(boxed.descriptor(), Reach::Local)
            .is_none());
        assert!(registry
            .get_function::<Equals>(boxed.descriptor(), Reach::Global)
            .is_some());
    }

    #[test]
    fn test_missing_function() {
        let registry = RegistryBuilder::new().build();
        let boxed = Boxed::new(true);

        assert_eq!(
            registry
                .try_call::<IsTrue, bool>(&boxed, |is_true| is_true(&boxed))
                .unwrap_err(),
            BoxingError::NotImplemented {
                function: "IsTrue",
                mapped: "bool"
            }
        );
        assert!(!registry.call::<IsTrue, bool>(&boxed, |is_true| is_true(&boxed)));
    }

    #[test]
    fn test_introspection() {
        let mut builder = RegistryBuilder::new();
        builder
            .register::<IsTrue, char>(is_true)
            .unwrap()
            .register::<Equals, char>(always_equal)
            .unwrap()
            .register_default::<Equals>(never_equal)
            .unwrap();
        builder.register_type::<bool>();
        let registry = builder.build();

        let names: Vec<_> = registry
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.type_name())
            .collect();
        assert_eq!(names, ["bool", "char"]);
        assert_eq!(
            registry.functions_of(&<char as MappedType>::DESCRIPTOR),
            ["Equals", "IsTrue"]
        );
        assert_eq!(registry.default_functions(), ["Equals"]);
    }

    #[test]
    fn test_builtins_keep_earlier_registrations() {
        let mut builder = RegistryBuilder::new();
        builder.register::<Equals, bool>(never_equal).unwrap();
        builder.register_builtins();
        let registry = builder.build();

        let boxed = Boxed::new(true);
        assert!(!registry.call::<Equals, bool>(&boxed, |equals| equals(&boxed, &boxed)));
        assert!(registry.default_function::<Equals>().is_some());
    }
}
