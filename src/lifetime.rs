//! Service lifetime definitions.

/// Service lifetimes controlling instance caching inside one container.
///
/// - **Singleton**: created at most once per container and shared
/// - **Transient**: created fresh on every resolution
///
/// # Examples
///
/// ```rust
/// use context_registry::{Container, ServiceCollection};
/// use std::sync::Arc;
///
/// struct WaterInstallation;
/// struct Visit(u32);
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(WaterInstallation);
/// services.add_transient_factory::<Visit, _>(|_| Ok(Visit(1)));
///
/// let container = services.build();
///
/// let w1 = container.get::<WaterInstallation>().unwrap();
/// let w2 = container.get::<WaterInstallation>().unwrap();
/// assert!(Arc::ptr_eq(&w1, &w2));
///
/// let v1 = container.get::<Visit>().unwrap();
/// let v2 = container.get::<Visit>().unwrap();
/// assert!(!Arc::ptr_eq(&v1, &v2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance per container
    Singleton,
    /// New instance per resolution
    Transient,
}

impl Lifetime {
    /// Whether instances of this lifetime are cached by the container.
    pub fn is_cached(self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Transient => f.write_str("transient"),
        }
    }
}
