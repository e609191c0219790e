//! Service registration types.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::traits::{AnyArc, ContainerCore};

/// Type-erased constructor; receives the container being resolved from.
pub(crate) type Ctor = Arc<dyn Fn(&dyn ContainerCore) -> DiResult<AnyArc> + Send + Sync>;

/// Service registration with lifetime and constructor
pub(crate) struct Registration {
    pub(crate) key: Key,
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Ctor,
    /// Singleton cache, lock-free once initialized
    pub(crate) singleton: OnceCell<AnyArc>,
}

impl Registration {
    pub(crate) fn new(key: Key, lifetime: Lifetime, ctor: Ctor) -> Self {
        Self {
            key,
            lifetime,
            ctor,
            singleton: OnceCell::new(),
        }
    }

    /// Service name if named, otherwise the type name.
    pub(crate) fn label(&self) -> String {
        self.key.to_string()
    }
}

/// Service registry holding all registrations of one container.
pub(crate) struct Registry {
    /// Registrations in insertion order
    pub(crate) entries: Vec<Registration>,
    /// Exact key -> entry index
    pub(crate) by_key: HashMap<Key, usize>,
    /// TypeId -> every entry of that type, named or not
    pub(crate) by_type: HashMap<TypeId, Vec<usize>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
            by_type: HashMap::new(),
        }
    }

    /// Inserts a registration, replacing any earlier one with the same key.
    pub(crate) fn insert(&mut self, registration: Registration) {
        if let Some(&index) = self.by_key.get(&registration.key) {
            self.entries[index] = registration;
            return;
        }

        let index = self.entries.len();
        self.by_key.insert(registration.key.clone(), index);
        self.by_type
            .entry(registration.key.type_id())
            .or_default()
            .push(index);
        self.entries.push(registration);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry indices that can satisfy `key`.
    pub(crate) fn candidates(&self, key: &Key) -> &[usize] {
        match key {
            Key::Type(id, _) => self.by_type.get(id).map(Vec::as_slice).unwrap_or(&[]),
            Key::Named(..) => self
                .by_key
                .get(key)
                .map(std::slice::from_ref)
                .unwrap_or(&[]),
        }
    }
}
