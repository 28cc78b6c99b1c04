//! String-keyed registry of lazily constructed capabilities.
//!
//! A [`Catalog`] is the fixed set of known kinds and their factories; the
//! [`CapabilityRegistry`] holds the handles resolved from it and publishes
//! every membership change through an [`Observable`].

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::observable::{Observable, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),
}

type Factory<H> = Rc<dyn Fn() -> H>;

/// Resolved handles keyed by capability kind, in insertion order.
pub type Resolved<H> = IndexMap<String, H>;

/// Fixed mapping from capability kind to a zero-argument constructor.
pub struct Catalog<H> {
    factories: IndexMap<String, Factory<H>>,
}

impl<H> Catalog<H> {
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, factory: impl Fn() -> H + 'static) -> Self {
        self.factories.insert(key.into(), Rc::new(factory));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn resolve(&self, key: &str) -> Option<H> {
        self.factories.get(key).map(|factory| factory())
    }
}

impl<H> Default for Catalog<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Catalog<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct CapabilityRegistry<H> {
    catalog: Catalog<H>,
    resolved: Observable<Resolved<H>>,
}

impl<H: Clone + 'static> CapabilityRegistry<H> {
    pub fn new(catalog: Catalog<H>) -> Self {
        Self {
            catalog,
            resolved: Observable::new(Resolved::new()),
        }
    }

    /// Resolve `key` from the catalog and insert the fresh handle.
    ///
    /// Adding a key that is already present builds a new handle and replaces
    /// the old one in place; the old handle is dropped without any teardown.
    pub fn add(&self, key: &str) -> Result<(), RegistryError> {
        let Some(handle) = self.catalog.resolve(key) else {
            tracing::debug!(key, "rejected unknown capability");
            return Err(RegistryError::UnknownCapability(key.to_string()));
        };
        tracing::debug!(key, "adding capability");
        self.resolved.update(|entries| {
            entries.insert(key.to_string(), handle);
        });
        Ok(())
    }

    /// Remove `key` if present. Subscribers are notified even when the key
    /// was absent, so layout derived from the mapping is always recomputed.
    pub fn remove(&self, key: &str) {
        tracing::debug!(key, "removing capability");
        self.resolved.update(|entries| {
            entries.shift_remove(key);
        });
    }

    pub fn list(&self) -> Vec<(String, H)> {
        self.resolved.with(|entries| {
            entries
                .iter()
                .map(|(key, handle)| (key.clone(), handle.clone()))
                .collect()
        })
    }

    pub fn get(&self, key: &str) -> Option<H> {
        self.resolved.with(|entries| entries.get(key).cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolved.with(|entries| entries.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.resolved.with(|entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn catalog(&self) -> &Catalog<H> {
        &self.catalog
    }

    pub fn resolved(&self) -> &Observable<Resolved<H>> {
        &self.resolved
    }

    pub fn subscribe(&self, callback: impl Fn(&Resolved<H>) + 'static) -> Subscription {
        self.resolved.subscribe(callback)
    }
}

impl<H: fmt::Debug> fmt::Debug for CapabilityRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("catalog", &self.catalog)
            .field("resolved", &self.resolved)
            .finish()
    }
}
