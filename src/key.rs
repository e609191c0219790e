//! Service key types for containers.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Key for service storage and lookup.
///
/// Every registration in a container is filed under a key. Unnamed lookups
/// use [`Key::Type`] and match any registration of that type; named lookups
/// use [`Key::Named`] and match exactly one.
///
/// # Examples
///
/// ```rust
/// use context_registry::{key_of_named, key_of_type, Key};
/// use std::any::TypeId;
///
/// let by_type = key_of_type::<u32>();
/// assert_eq!(by_type.display_name(), "u32");
/// assert_eq!(by_type.service_name(), None);
///
/// let by_name = key_of_named::<u32>("port");
/// assert_eq!(by_name.service_name(), Some("port"));
/// assert_eq!(by_name.type_id(), TypeId::of::<u32>());
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type (or trait object) key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Named key with TypeId, type name, and service name
    ///
    /// Multiple services of the same type are told apart by name.
    Named(TypeId, &'static str, Arc<str>),
}

impl Key {
    /// Get the type name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Named(_, name, _) => name,
        }
    }

    /// Get the service name for named keys, or None for unnamed keys.
    pub fn service_name(&self) -> Option<&str> {
        match self {
            Key::Type(_, _) => None,
            Key::Named(_, _, name) => Some(name),
        }
    }

    /// The TypeId of the service this key stands for.
    pub fn type_id(&self) -> TypeId {
        match self {
            Key::Type(id, _) => *id,
            Key::Named(id, _, _) => *id,
        }
    }
}

// TypeId-only comparison; the type name string is diagnostic
impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Named(a, _, name_a), Key::Named(b, _, name_b)) => a == b && name_a == name_b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Named(id, _, name) => {
                1u8.hash(state);
                id.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(_, type_name) => f.write_str(type_name),
            Key::Named(_, type_name, name) => write!(f, "{} ({})", name, type_name),
        }
    }
}

/// Key for an unnamed lookup of `T`.
#[inline]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for the service of type `T` registered under `name`.
#[inline]
pub fn key_of_named<T: ?Sized + 'static>(name: &str) -> Key {
    Key::Named(TypeId::of::<T>(), std::any::type_name::<T>(), Arc::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn type_name_is_ignored_for_equality() {
        let a = Key::Type(TypeId::of::<u8>(), "u8");
        let b = Key::Type(TypeId::of::<u8>(), "renamed");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn named_and_unnamed_never_match() {
        assert_ne!(key_of_type::<u8>(), key_of_named::<u8>("u8"));
        assert_ne!(key_of_named::<u8>("a"), key_of_named::<u8>("b"));
        assert_ne!(key_of_named::<u8>("a"), key_of_named::<u16>("a"));
    }

    #[test]
    fn display_includes_service_name() {
        assert_eq!(key_of_named::<u32>("port").to_string(), "port (u32)");
        assert_eq!(key_of_type::<u32>().to_string(), "u32");
    }
}
