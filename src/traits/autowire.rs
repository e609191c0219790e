//! Autowiring of objects constructed outside the container.

use crate::error::DiResult;
use crate::traits::Container;

/// An object whose dependencies can be populated by a container after it
/// was constructed elsewhere.
///
/// Population happens in two phases. [`resolve_wiring`](Self::resolve_wiring)
/// looks up every dependency and may fail; only when it succeeds is
/// [`apply_wiring`](Self::apply_wiring) called to assign them. A failed
/// injection therefore never leaves a half-populated object behind.
///
/// # Examples
///
/// ```
/// use context_registry::{Autowire, Container, DiResult, ServiceCollection};
/// use std::sync::Arc;
///
/// struct WaterInstallation;
/// struct Family;
///
/// #[derive(Default)]
/// struct House {
///     water: Option<Arc<WaterInstallation>>,
///     family: Option<Arc<Family>>,
/// }
///
/// impl Autowire for House {
///     type Wiring = (Arc<WaterInstallation>, Arc<Family>);
///
///     fn resolve_wiring<C: Container + ?Sized>(container: &C) -> DiResult<Self::Wiring> {
///         Ok((container.get()?, container.lookup("myFamily")?))
///     }
///
///     fn apply_wiring(&mut self, (water, family): Self::Wiring) {
///         self.water = Some(water);
///         self.family = Some(family);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(WaterInstallation);
/// services.add_named_singleton("myFamily", Family);
/// let container = services.build();
///
/// let mut house = House::default();
/// container.autowire(&mut house).unwrap();
/// assert!(house.water.is_some() && house.family.is_some());
/// ```
pub trait Autowire {
    /// Everything the object needs, resolved but not yet assigned.
    type Wiring;

    /// Resolves all dependencies from `container`.
    fn resolve_wiring<C: Container + ?Sized>(container: &C) -> DiResult<Self::Wiring>;

    /// Assigns previously resolved dependencies.
    fn apply_wiring(&mut self, wiring: Self::Wiring);
}
