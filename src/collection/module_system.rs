//! Service module system for modular registration.
//!
//! A module is a reusable unit of registrations. Modules are what a
//! [`ModuleCatalog`](crate::ModuleCatalog) files under a configuration
//! identifier.

use crate::{DiResult, ServiceCollection};

/// A module that can register services with a ServiceCollection.
///
/// Modules take `&self` so a catalog can apply the same module every time
/// it builds a container. Closures of the right shape are modules too.
///
/// # Example
///
/// ```rust
/// use context_registry::{Container, DiResult, ServiceCollection, ServiceCollectionExt, ServiceModule};
///
/// struct Family { members: usize }
///
/// struct FamilyModule;
///
/// impl ServiceModule for FamilyModule {
///     fn register_services(&self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_named_singleton("myFamily", Family { members: 3 });
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let container = ServiceCollection::new().add_module(&FamilyModule)?.build();
/// assert_eq!(container.lookup::<Family>("myFamily")?.members, 3);
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule: Send + Sync {
    /// Register this module's services with the ServiceCollection.
    fn register_services(&self, services: &mut ServiceCollection) -> DiResult<()>;
}

impl<F> ServiceModule for F
where
    F: Fn(&mut ServiceCollection) -> DiResult<()> + Send + Sync,
{
    fn register_services(&self, services: &mut ServiceCollection) -> DiResult<()> {
        self(services)
    }
}

/// Extension trait for chaining module registration.
pub trait ServiceCollectionExt {
    /// Add a module to the service collection using extension method syntax.
    fn add_module<M: ServiceModule + ?Sized>(self, module: &M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule + ?Sized>(mut self, module: &M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}
