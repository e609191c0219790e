//! Service collection module.
//!
//! This module contains the ServiceCollection type used to declare
//! registrations before building a [`ServiceContainer`].

use std::sync::Arc;

use crate::error::DiResult;
use crate::key::{key_of_named, key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::registration::{Registration, Registry};
use crate::traits::{AnyArc, ContainerCore};
use crate::ServiceContainer;

pub mod module_system;
pub use module_system::*;

/// Registrations for one container.
///
/// Registering a second service under the same key (same type and name)
/// replaces the first.
pub struct ServiceCollection {
    label: String,
    registry: Registry,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self::labelled("anonymous")
    }

    /// Creates an empty collection whose container reports `label`,
    /// typically the configuration identifier it is built for.
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            registry: Registry::new(),
        }
    }

    /// The label the built container will carry.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    // ----- Concrete Type Registrations -----

    /// Registers an existing instance as a singleton.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use context_registry::ServiceCollection;
    /// struct ElectricalInstallation { voltage: u32 }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(ElectricalInstallation { voltage: 230 });
    /// ```
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.add_instance(key_of_type::<T>(), Arc::new(value))
    }

    /// Registers an existing instance as a singleton under `name`.
    pub fn add_named_singleton<T: 'static + Send + Sync>(
        &mut self,
        name: &str,
        value: T,
    ) -> &mut Self {
        self.add_instance(key_of_named::<T>(name), Arc::new(value))
    }

    /// Registers a singleton factory that runs on first request.
    ///
    /// The factory receives the container so it can resolve its own
    /// dependencies, and may fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use context_registry::{Container, ServiceCollection};
    /// # use std::sync::Arc;
    /// struct Street { name: String }
    /// struct Address { street: Arc<Street>, number: u32 }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Street { name: "Main".to_string() });
    /// services.add_singleton_factory::<Address, _>(|c| {
    ///     Ok(Address { street: c.get::<Street>()?, number: 7 })
    /// });
    ///
    /// let container = services.build();
    /// assert_eq!(container.get::<Address>().unwrap().street.name, "Main");
    /// ```
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&dyn ContainerCore) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(key_of_type::<T>(), Lifetime::Singleton, factory)
    }

    /// Registers a singleton factory under `name`.
    pub fn add_named_singleton_factory<T, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&dyn ContainerCore) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(key_of_named::<T>(name), Lifetime::Singleton, factory)
    }

    /// Registers a factory that runs on every resolution.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&dyn ContainerCore) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(key_of_type::<T>(), Lifetime::Transient, factory)
    }

    /// Registers a transient factory under `name`.
    pub fn add_named_transient_factory<T, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&dyn ContainerCore) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(key_of_named::<T>(name), Lifetime::Transient, factory)
    }

    // ----- Trait Registrations -----

    /// Registers a trait-object singleton, resolved with
    /// [`Container::get_trait`](crate::Container::get_trait).
    pub fn add_singleton_trait<T: ?Sized + 'static + Send + Sync>(&mut self, value: Arc<T>) -> &mut Self {
        self.add_instance(key_of_type::<T>(), Arc::new(value))
    }

    /// Registers a trait-object singleton under `name`.
    pub fn add_named_singleton_trait<T: ?Sized + 'static + Send + Sync>(
        &mut self,
        name: &str,
        value: Arc<T>,
    ) -> &mut Self {
        self.add_instance(key_of_named::<T>(name), Arc::new(value))
    }

    /// Builds the container. Singletons are created lazily; call
    /// [`ServiceContainer::initialize_singletons`] to create them up front.
    pub fn build(self) -> ServiceContainer {
        ServiceContainer::new(self.label, self.registry)
    }

    // ----- Internal -----

    fn add_instance(&mut self, key: Key, value: AnyArc) -> &mut Self {
        let ctor = move |_: &dyn ContainerCore| -> DiResult<AnyArc> { Ok(value.clone()) };
        self.registry
            .insert(Registration::new(key, Lifetime::Singleton, Arc::new(ctor)));
        self
    }

    fn add_factory<T, F>(&mut self, key: Key, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&dyn ContainerCore) -> DiResult<T> + Send + Sync + 'static,
    {
        let ctor = move |c: &dyn ContainerCore| -> DiResult<AnyArc> {
            Ok(Arc::new(factory(c)?) as AnyArc)
        };
        self.registry.insert(Registration::new(key, lifetime, Arc::new(ctor)));
        self
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("label", &self.label)
            .field("registrations", &self.registry.len())
            .finish()
    }
}
