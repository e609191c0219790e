//! Registry of containers keyed by configuration identifier.
//!
//! The registry lets code whose lifecycle belongs to someone else (a stream
//! processing engine instantiating job functions, a plugin host, ...) get
//! its collaborators from a dependency injection container without that
//! someone knowing about injection. Each configuration identifier maps to
//! exactly one container, created lazily on first use and shared from then
//! on.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::{DiResult, RegistryError, RegistryResult};
use crate::traits::{Autowire, Container, SharedContainer};

pub mod factory;
pub use factory::{ContainerFactory, ModuleCatalog};

type Slot = Arc<OnceCell<SharedContainer>>;

/// Lazily creates and caches one container per configuration identifier.
///
/// # Construction guarantee
///
/// For every identifier at most one container is ever constructed and
/// returned, even when many threads ask for it at the same time. Concurrent
/// first requests for the same identifier wait for a single construction;
/// requests for other identifiers are not held up by it. A failed
/// construction caches nothing, so the next request tries again.
///
/// The [`ContainerFactory`] passed to a constructor must not request its own
/// identifier from the same registry while building it; that call would wait
/// on itself forever.
///
/// # Sharing
///
/// `ContainerRegistry` is cheap to clone; clones share the same containers.
///
/// # Examples
///
/// ```
/// use context_registry::{
///     Autowire, Container, ContainerRegistry, DiResult, ModuleCatalog, ServiceCollection,
/// };
/// use std::sync::Arc;
///
/// struct ElectricalInstallation;
///
/// #[derive(Default)]
/// struct House {
///     electrical: Option<Arc<ElectricalInstallation>>,
/// }
///
/// impl Autowire for House {
///     type Wiring = Arc<ElectricalInstallation>;
///
///     fn resolve_wiring<C: Container + ?Sized>(container: &C) -> DiResult<Self::Wiring> {
///         container.get()
///     }
///
///     fn apply_wiring(&mut self, electrical: Self::Wiring) {
///         self.electrical = Some(electrical);
///     }
/// }
///
/// let mut catalog = ModuleCatalog::new();
/// catalog.add_module("app.config", |services: &mut ServiceCollection| -> DiResult<()> {
///     services.add_singleton(ElectricalInstallation);
///     Ok(())
/// });
///
/// let registry = ContainerRegistry::new(catalog);
/// let house = registry.inject_into(House::default(), "app.config").unwrap();
/// assert!(house.electrical.is_some());
///
/// let first = registry.get_container("app.config").unwrap();
/// let second = registry.get_container("app.config").unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Clone)]
pub struct ContainerRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    factory: Box<dyn ContainerFactory>,
    containers: Mutex<HashMap<String, Slot>>,
}

impl ContainerRegistry {
    /// Creates an empty registry that builds containers with `factory`.
    pub fn new<F: ContainerFactory + 'static>(factory: F) -> Self {
        Self::with_containers(factory, std::iter::empty::<(String, SharedContainer)>())
    }

    /// Creates a registry pre-populated with `containers`.
    ///
    /// Identifiers listed here are never passed to `factory`. This is the way
    /// to hand a registry test doubles without touching configuration.
    pub fn with_containers<F, I, S>(factory: F, containers: I) -> Self
    where
        F: ContainerFactory + 'static,
        I: IntoIterator<Item = (S, SharedContainer)>,
        S: Into<String>,
    {
        let containers = containers
            .into_iter()
            .map(|(identifier, container)| (identifier.into(), filled_slot(container)))
            .collect();
        Self {
            inner: Arc::new(RegistryInner {
                factory: Box::new(factory),
                containers: Mutex::new(containers),
            }),
        }
    }

    /// Returns the container for `identifier`, constructing it on first use.
    ///
    /// Every call for the same identifier returns the same `Arc`.
    pub fn get_container(&self, identifier: &str) -> RegistryResult<SharedContainer> {
        let slot = self.slot(identifier);
        if let Some(container) = slot.get() {
            tracing::trace!(identifier, "container cache hit");
            return Ok(container.clone());
        }

        let result = slot
            .get_or_try_init(|| -> DiResult<SharedContainer> {
                tracing::debug!(identifier, "constructing container");
                let started = Instant::now();
                let container = self.inner.factory.create(identifier)?;
                tracing::debug!(identifier, elapsed = ?started.elapsed(), "container constructed");
                Ok(container)
            })
            .cloned();
        drop(slot);

        result.map_err(|source| {
            self.evict_unclaimed(identifier);
            RegistryError::ContainerConstruction {
                identifier: identifier.to_string(),
                source,
            }
        })
    }

    /// Populates `target` from the container for `identifier` and hands it back.
    ///
    /// Every dependency is resolved before any is assigned. If one cannot be
    /// satisfied the error is returned and `target` is dropped untouched; use
    /// [`inject_into_mut`](Self::inject_into_mut) to keep the object on
    /// failure. The cached container is unaffected either way.
    pub fn inject_into<T: Autowire>(&self, mut target: T, identifier: &str) -> RegistryResult<T> {
        self.inject_into_mut(&mut target, identifier)?;
        Ok(target)
    }

    /// Populates `target` in place from the container for `identifier`.
    pub fn inject_into_mut<T: Autowire>(&self, target: &mut T, identifier: &str) -> RegistryResult<()> {
        let container = self.get_container(identifier)?;
        container
            .autowire(target)
            .map_err(|source| RegistryError::DependencyInjection {
                identifier: identifier.to_string(),
                target: std::any::type_name::<T>(),
                source,
            })?;
        tracing::trace!(identifier, target = std::any::type_name::<T>(), "dependencies injected");
        Ok(())
    }

    /// Whether a container for `identifier` has been constructed or supplied.
    pub fn contains(&self, identifier: &str) -> bool {
        self.inner
            .containers
            .lock()
            .get(identifier)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Identifiers that currently have a container, in no particular order.
    pub fn identifiers(&self) -> Vec<String> {
        self.inner
            .containers
            .lock()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(identifier, _)| identifier.clone())
            .collect()
    }

    /// Replaces the container stored for `identifier`, bypassing the factory.
    ///
    /// Only for substituting test doubles; prefer
    /// [`with_containers`](Self::with_containers).
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_container(&self, identifier: impl Into<String>, container: SharedContainer) {
        self.inner
            .containers
            .lock()
            .insert(identifier.into(), filled_slot(container));
    }

    /// The slot for `identifier`, inserting an empty one if needed. The map
    /// lock is released before the slot is initialized.
    fn slot(&self, identifier: &str) -> Slot {
        let mut containers = self.inner.containers.lock();
        if let Some(slot) = containers.get(identifier) {
            return slot.clone();
        }
        let slot = Slot::default();
        containers.insert(identifier.to_string(), slot.clone());
        slot
    }

    /// Drops the slot for `identifier` if it is still empty and no caller is
    /// waiting on it. An unheld empty slot is equivalent to no entry.
    fn evict_unclaimed(&self, identifier: &str) {
        let mut containers = self.inner.containers.lock();
        let unclaimed = containers
            .get(identifier)
            .is_some_and(|slot| slot.get().is_none() && Arc::strong_count(slot) == 1);
        if unclaimed {
            containers.remove(identifier);
            tracing::trace!(identifier, "empty slot evicted after failed construction");
        }
    }
}

impl std::fmt::Debug for ContainerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

fn filled_slot(container: SharedContainer) -> Slot {
    Arc::new(OnceCell::with_value(container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiError, ServiceCollection};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(calls: Arc<AtomicUsize>) -> impl ContainerFactory {
        move |identifier: &str| -> DiResult<SharedContainer> {
            calls.fetch_add(1, Ordering::SeqCst);
            let mut services = ServiceCollection::labelled(identifier);
            services.add_singleton(identifier.to_string());
            Ok(Arc::new(services.build()))
        }
    }

    #[test]
    fn set_container_bypasses_construction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ContainerRegistry::new(counting_factory(calls.clone()));

        let mut fake = ServiceCollection::new();
        fake.add_singleton("fake".to_string());
        let fake: SharedContainer = Arc::new(fake.build());

        registry.set_container("app.config", fake.clone());
        let resolved = registry.get_container("app.config").unwrap();

        assert!(Arc::ptr_eq(&resolved, &fake));
        assert_eq!(&*resolved.get::<String>().unwrap(), "fake");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn set_container_overwrites_constructed_container() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ContainerRegistry::new(counting_factory(calls.clone()));
        let built = registry.get_container("app.config").unwrap();

        let fake: SharedContainer = Arc::new(ServiceCollection::new().build());
        registry.set_container("app.config", fake.clone());

        let resolved = registry.get_container("app.config").unwrap();
        assert!(!Arc::ptr_eq(&resolved, &built));
        assert!(Arc::ptr_eq(&resolved, &fake));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_container_can_alias_identifiers() {
        let registry = ContainerRegistry::new(counting_factory(Arc::new(AtomicUsize::new(0))));
        let shared: SharedContainer = Arc::new(ServiceCollection::new().build());
        registry.set_container("a", shared.clone());
        registry.set_container("b", shared.clone());

        assert!(Arc::ptr_eq(
            &registry.get_container("a").unwrap(),
            &registry.get_container("b").unwrap()
        ));
    }

    #[test]
    fn failed_construction_leaves_no_entry() {
        let registry = ContainerRegistry::new(|identifier: &str| -> DiResult<SharedContainer> {
            Err(DiError::UnknownConfiguration(identifier.to_string()))
        });

        let err = registry
            .get_container("missing")
            .err()
            .expect("construction should fail");
        assert_eq!(err.identifier(), "missing");
        assert!(!registry.contains("missing"));
        assert!(registry.identifiers().is_empty());
    }

    #[test]
    fn failed_identifiers_do_not_accumulate_slots() {
        let registry = ContainerRegistry::new(|identifier: &str| -> DiResult<SharedContainer> {
            Err(DiError::UnknownConfiguration(identifier.to_string()))
        });

        for i in 0..1_000 {
            assert!(registry.get_container(&format!("bogus.{}", i)).is_err());
        }
        assert!(registry.get_container("bogus.0").is_err());

        assert_eq!(registry.inner.containers.lock().len(), 0);
    }

    #[test]
    fn concurrent_failures_leave_no_slot() {
        let registry = ContainerRegistry::new(|identifier: &str| -> DiResult<SharedContainer> {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Err(DiError::UnknownConfiguration(identifier.to_string()))
        });
        let barrier = std::sync::Barrier::new(8);

        crossbeam_utils::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|_| {
                    barrier.wait();
                    assert!(registry.get_container("shared.missing").is_err());
                });
            }
        })
        .unwrap();

        assert_eq!(registry.inner.containers.lock().len(), 0);
    }

    #[test]
    fn retry_after_failure_keeps_single_entry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let registry = ContainerRegistry::new(move |identifier: &str| -> DiResult<SharedContainer> {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(DiError::Configuration("not ready".to_string()));
            }
            Ok(Arc::new(ServiceCollection::labelled(identifier).build()))
        });

        assert!(registry.get_container("app.config").is_err());
        let first = registry.get_container("app.config").unwrap();
        let second = registry.get_container("app.config").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(registry.inner.containers.lock().len(), 1);
    }
}
