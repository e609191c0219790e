//! Container construction from configuration identifiers.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::traits::SharedContainer;
use crate::{ServiceCollection, ServiceModule};

/// Builds a container for a configuration identifier.
///
/// The registry calls this at most once per identifier (again only after a
/// failure). Construction may be slow and may have side effects.
///
/// Closures `Fn(&str) -> DiResult<SharedContainer>` are factories:
///
/// ```
/// use context_registry::{ContainerFactory, DiError, ServiceCollection, SharedContainer};
/// use std::sync::Arc;
///
/// let factory = |identifier: &str| -> Result<SharedContainer, DiError> {
///     Ok(Arc::new(ServiceCollection::labelled(identifier).build()))
/// };
/// assert!(factory.create("app.config").is_ok());
/// ```
pub trait ContainerFactory: Send + Sync {
    /// Builds the container for `identifier`.
    fn create(&self, identifier: &str) -> DiResult<SharedContainer>;
}

impl<F> ContainerFactory for F
where
    F: Fn(&str) -> DiResult<SharedContainer> + Send + Sync,
{
    fn create(&self, identifier: &str) -> DiResult<SharedContainer> {
        self(identifier)
    }
}

/// Catalog of service modules filed under configuration identifiers.
///
/// Identifiers are dot-separated package names. Building the container for
/// an identifier applies every module filed under that identifier or any
/// package below it, in the order they were added. So
/// `"app.config"` picks up modules filed under `"app.config"` and
/// `"app.config.storage"`, but not `"app.configuration"`.
///
/// By default every singleton is created while the container is built, so
/// a configuration that cannot be satisfied fails construction rather than
/// the first lookup.
///
/// # Examples
///
/// ```
/// use context_registry::{Container, ContainerFactory, DiResult, ModuleCatalog, ServiceCollection};
///
/// struct Family;
///
/// let mut catalog = ModuleCatalog::new();
/// catalog.add_module("app.config.family", |services: &mut ServiceCollection| -> DiResult<()> {
///     services.add_named_singleton("myFamily", Family);
///     Ok(())
/// });
///
/// let container = catalog.create("app.config").unwrap();
/// assert!(container.lookup::<Family>("myFamily").is_ok());
/// assert!(catalog.create("other").is_err());
/// ```
#[derive(Default)]
pub struct ModuleCatalog {
    modules: Vec<(String, Arc<dyn ServiceModule>)>,
    lazy_singletons: bool,
}

impl ModuleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `module` under `identifier`.
    pub fn add_module<M>(&mut self, identifier: impl Into<String>, module: M) -> &mut Self
    where
        M: ServiceModule + 'static,
    {
        let module: Arc<dyn ServiceModule> = Arc::new(module);
        self.modules.push((identifier.into(), module));
        self
    }

    /// Leaves singletons to be created on first request instead of at
    /// construction.
    pub fn lazy_singletons(&mut self) -> &mut Self {
        self.lazy_singletons = true;
        self
    }

    /// Every identifier a module was filed under, in insertion order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (identifier, _) in &self.modules {
            if !seen.contains(&identifier.as_str()) {
                seen.push(identifier);
            }
        }
        seen
    }

    fn modules_for<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = &'a dyn ServiceModule> + 'a {
        self.modules
            .iter()
            .filter(move |(filed_under, _)| covers(identifier, filed_under))
            .map(|(_, module)| module.as_ref())
    }
}

impl ContainerFactory for ModuleCatalog {
    fn create(&self, identifier: &str) -> DiResult<SharedContainer> {
        let mut services = ServiceCollection::labelled(identifier);
        let mut applied = 0usize;
        for module in self.modules_for(identifier) {
            module.register_services(&mut services)?;
            applied += 1;
        }
        if applied == 0 {
            return Err(DiError::UnknownConfiguration(identifier.to_string()));
        }

        let container = services.build();
        if !self.lazy_singletons {
            container.initialize_singletons()?;
        }
        tracing::trace!(identifier, modules = applied, services = container.len(), "container built from catalog");
        Ok(Arc::new(container))
    }
}

impl std::fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("identifiers", &self.identifiers())
            .field("lazy_singletons", &self.lazy_singletons)
            .finish()
    }
}

/// Whether a module filed under `filed_under` belongs to package `identifier`.
fn covers(identifier: &str, filed_under: &str) -> bool {
    match filed_under.strip_prefix(identifier) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_prefix_matching() {
        assert!(covers("app.config", "app.config"));
        assert!(covers("app.config", "app.config.storage"));
        assert!(!covers("app.config", "app.configuration"));
        assert!(!covers("app.config", "app"));
        assert!(!covers("app.config.storage", "app.config"));
    }

    #[test]
    fn identifiers_are_deduplicated() {
        let noop = |_: &mut ServiceCollection| -> DiResult<()> { Ok(()) };
        let mut catalog = ModuleCatalog::new();
        catalog
            .add_module("a", noop)
            .add_module("b", noop)
            .add_module("a", noop);
        assert_eq!(catalog.identifiers(), vec!["a", "b"]);
    }
}
