//! Service container module.
//!
//! This module contains the ServiceContainer type, the bundled
//! [`ContainerCore`] implementation built from a [`ServiceCollection`].
//!
//! [`ServiceCollection`]: crate::ServiceCollection

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::with_circular_guard;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{Registration, Registry};
use crate::traits::{AnyArc, ContainerCore};

/// Container resolving services registered in a [`ServiceCollection`].
///
/// # Resolution
///
/// - A named lookup matches the registration with that exact type and name.
/// - An unnamed lookup matches the one registration of that type, named or
///   not. No match is [`DiError::NotFound`]; more than one is
///   [`DiError::Ambiguous`].
/// - Singletons are created once per container, on first request or by
///   [`initialize_singletons`](Self::initialize_singletons). Transients are
///   created on every request.
/// - A factory that (transitively) requests itself yields
///   [`DiError::Circular`] instead of recursing.
///
/// # Thread Safety
///
/// ServiceContainer is `Send + Sync` and cheap to clone; clones share the
/// same singleton instances. Concurrent first requests for a singleton run
/// its factory once.
///
/// # Examples
///
/// ```
/// use context_registry::{Container, ServiceCollection};
/// use std::sync::Arc;
///
/// struct ElectricalInstallation;
/// struct WaterInstallation;
///
/// let mut services = ServiceCollection::labelled("app.config");
/// services.add_singleton(ElectricalInstallation);
/// services.add_singleton_factory::<WaterInstallation, _>(|_| Ok(WaterInstallation));
///
/// let container = services.build();
/// assert_eq!(container.label(), "app.config");
///
/// let first = container.get::<WaterInstallation>().unwrap();
/// let second = container.get::<WaterInstallation>().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
///
/// [`ServiceCollection`]: crate::ServiceCollection
#[derive(Clone)]
pub struct ServiceContainer {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    label: String,
    registry: Registry,
}

impl ServiceContainer {
    pub(crate) fn new(label: String, registry: Registry) -> Self {
        Self {
            inner: Arc::new(ContainerInner { label, registry }),
        }
    }

    /// The label given to the collection, usually the configuration identifier.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    /// Whether the container has no registrations.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.len() == 0
    }

    /// Creates every singleton now instead of on first request.
    ///
    /// Stops at the first failing singleton and returns its error. Singletons
    /// created before the failure stay cached.
    ///
    /// ```
    /// use context_registry::{Container, DiError, ServiceCollection};
    ///
    /// struct Family;
    /// struct House;
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_factory::<House, _>(|c| {
    ///     c.get::<Family>()?;
    ///     Ok(House)
    /// });
    ///
    /// let container = services.build();
    /// assert!(matches!(container.initialize_singletons(), Err(DiError::NotFound(_))));
    /// ```
    pub fn initialize_singletons(&self) -> DiResult<()> {
        let mut count = 0;
        for reg in &self.inner.registry.entries {
            if reg.lifetime.is_cached() {
                self.instantiate(reg)?;
                count += 1;
            }
        }
        tracing::trace!(container = %self.inner.label, singletons = count, "singletons initialized");
        Ok(())
    }

    fn instantiate(&self, reg: &Registration) -> DiResult<AnyArc> {
        if let Some(existing) = reg.singleton.get() {
            return Ok(existing.clone());
        }

        let guard_name = format!("{}::{}", self.inner.label, reg.label());
        with_circular_guard(guard_name, || match reg.lifetime {
            Lifetime::Singleton => reg
                .singleton
                .get_or_try_init(|| (reg.ctor)(self))
                .cloned(),
            Lifetime::Transient => (reg.ctor)(self),
        })
    }
}

impl ContainerCore for ServiceContainer {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        let registry = &self.inner.registry;
        match registry.candidates(key) {
            [] => Err(DiError::NotFound(key.to_string())),
            [index] => self.instantiate(&registry.entries[*index]),
            many => Err(DiError::Ambiguous {
                type_name: key.display_name(),
                candidates: many
                    .iter()
                    .map(|&index| registry.entries[index].label())
                    .collect(),
            }),
        }
    }

    fn contains_key(&self, key: &Key) -> bool {
        !self.inner.registry.candidates(key).is_empty()
    }

    fn service_names(&self) -> Vec<String> {
        self.inner
            .registry
            .entries
            .iter()
            .map(Registration::label)
            .collect()
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("label", &self.inner.label)
            .field("services", &self.service_names())
            .finish()
    }
}
