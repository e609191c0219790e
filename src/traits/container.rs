//! Container traits for service lookup and autowiring.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{key_of_named, key_of_type, Key};
use crate::traits::Autowire;

/// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// A container shared between the registry and its callers.
pub type SharedContainer = Arc<dyn ContainerCore>;

/// Core container trait for object-safe service lookup.
///
/// This is the capability the registry depends on. Anything that can answer
/// keyed lookups can back a [`ContainerRegistry`](crate::ContainerRegistry);
/// the bundled [`ServiceContainer`](crate::ServiceContainer) is one such
/// implementation.
///
/// Most callers use the [`Container`] trait instead, which is implemented
/// for every `ContainerCore` and adds typed helpers on top.
pub trait ContainerCore: Send + Sync {
    /// Resolves the service stored under `key`.
    ///
    /// `Key::Type` matches any single registration of the type, named or
    /// not. `Key::Named` matches only the registration with that name.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Whether a lookup of `key` would find a registration.
    fn contains_key(&self, key: &Key) -> bool;

    /// Human-readable names of everything this container can provide.
    fn service_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Typed lookups and autowiring on top of [`ContainerCore`].
///
/// # Examples
///
/// ```
/// use context_registry::{Container, ServiceCollection};
///
/// struct Family { members: usize }
///
/// let mut services = ServiceCollection::new();
/// services.add_named_singleton("myFamily", Family { members: 4 });
///
/// let container = services.build();
/// assert_eq!(container.lookup::<Family>("myFamily").unwrap().members, 4);
/// assert_eq!(container.get::<Family>().unwrap().members, 4);
/// assert!(container.lookup::<Family>("yourFamily").is_err());
/// ```
pub trait Container: ContainerCore {
    /// Resolves the only service of type `T`.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_type::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves the service of type `T` registered under `name`.
    fn lookup<T: 'static + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_named::<T>(name))?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`get`](Self::get), but a missing registration is `Ok(None)`.
    ///
    /// Other failures (ambiguity, cycles, a failing factory) still propagate.
    fn get_optional<T: 'static + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        match self.get::<T>() {
            Ok(service) => Ok(Some(service)),
            Err(DiError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Resolves the only trait-object service of type `T`.
    ///
    /// ```
    /// use context_registry::{Container, ServiceCollection};
    /// use std::sync::Arc;
    ///
    /// trait Installation: Send + Sync {
    ///     fn kind(&self) -> &str;
    /// }
    ///
    /// struct Electrical;
    /// impl Installation for Electrical {
    ///     fn kind(&self) -> &str { "electrical" }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait(Arc::new(Electrical) as Arc<dyn Installation>);
    ///
    /// let container = services.build();
    /// let installation = container.get_trait::<dyn Installation>().unwrap();
    /// assert_eq!(installation.kind(), "electrical");
    /// ```
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_type::<T>())?;
        // Trait objects are stored as Arc<Arc<dyn Trait>>
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves the trait-object service of type `T` registered under `name`.
    fn lookup_trait<T: ?Sized + 'static + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_named::<T>(name))?;
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Whether a service of type `T` is registered.
    fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(&key_of_type::<T>())
    }

    /// Populates the dependencies of an existing object.
    ///
    /// All dependencies are resolved before anything is assigned; on error
    /// `target` is left exactly as it was.
    fn autowire<T: Autowire>(&self, target: &mut T) -> DiResult<()> {
        let wiring = T::resolve_wiring(self)?;
        target.apply_wiring(wiring);
        Ok(())
    }
}

impl<C: ContainerCore + ?Sized> Container for C {}

