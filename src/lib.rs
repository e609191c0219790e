//! # context-registry
//!
//! Lazily built, per-configuration dependency injection containers for
//! objects whose construction you do not control.
//!
//! Stream processing engines, plugin hosts and similar runtimes instantiate
//! user objects themselves, so those objects cannot receive collaborators
//! through a constructor. Instead they ask a [`ContainerRegistry`] to inject
//! them from the container built for a configuration identifier. The
//! registry builds each container once, on first use, and shares it from
//! then on.
//!
//! ## Features
//!
//! - **Exactly-once construction**: one container per identifier, even under
//!   concurrent first access
//! - **Retry after failure**: a failed construction caches nothing
//! - **All-or-nothing injection**: an object is only touched once every
//!   dependency it declares has been resolved
//! - **Pluggable containers**: anything implementing [`ContainerCore`] can be
//!   served; [`ServiceContainer`] is bundled
//! - **Module catalogs**: [`ModuleCatalog`] maps dotted configuration
//!   identifiers to [`ServiceModule`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use context_registry::{
//!     Autowire, Container, ContainerRegistry, DiResult, ModuleCatalog, ServiceCollection,
//! };
//! use std::sync::Arc;
//!
//! struct WaterInstallation;
//! struct Family { name: String }
//!
//! // Created by someone else, populated afterwards
//! #[derive(Default)]
//! struct House {
//!     water: Option<Arc<WaterInstallation>>,
//!     family: Option<Arc<Family>>,
//! }
//!
//! impl Autowire for House {
//!     type Wiring = (Arc<WaterInstallation>, Arc<Family>);
//!
//!     fn resolve_wiring<C: Container + ?Sized>(c: &C) -> DiResult<Self::Wiring> {
//!         Ok((c.get()?, c.lookup("myFamily")?))
//!     }
//!
//!     fn apply_wiring(&mut self, (water, family): Self::Wiring) {
//!         self.water = Some(water);
//!         self.family = Some(family);
//!     }
//! }
//!
//! let mut catalog = ModuleCatalog::new();
//! catalog.add_module("app.config", |services: &mut ServiceCollection| -> DiResult<()> {
//!     services.add_singleton(WaterInstallation);
//!     services.add_named_singleton("myFamily", Family { name: "Smith".into() });
//!     Ok(())
//! });
//!
//! let registry = ContainerRegistry::new(catalog);
//! let house = registry.inject_into(House::default(), "app.config").unwrap();
//! assert_eq!(house.family.unwrap().name, "Smith");
//!
//! let family = registry
//!     .get_container("app.config")
//!     .unwrap()
//!     .lookup::<Family>("myFamily")
//!     .unwrap();
//! assert_eq!(family.name, "Smith");
//! ```

// Module declarations
pub mod collection;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod registry;
pub mod traits;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceModule};
pub use error::{DiError, DiResult, RegistryError, RegistryResult};
pub use key::{key_of_named, key_of_type, Key};
pub use lifetime::Lifetime;
pub use provider::ServiceContainer;
pub use registry::{ContainerFactory, ContainerRegistry, ModuleCatalog};
pub use traits::{AnyArc, Autowire, Container, ContainerCore, SharedContainer};
