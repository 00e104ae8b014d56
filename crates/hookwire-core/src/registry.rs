//! Process-wide catalog of handler implementations.
//!
//! The registry is populated once during bootstrap through explicit
//! [`HandlerRegistry::register`] calls, then wrapped in an `Arc` and shared
//! read-only with the dispatch engine and the synchronizer.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;
use crate::types::HandlerDescriptor;
use crate::{Error, ErrorKind, Result, TRACING_TARGET_REGISTRY};

/// A registered handler: name, description and implementation.
#[derive(Clone)]
pub struct RegistryEntry {
    name: String,
    description: String,
    handler: Arc<dyn Handler>,
}

impl RegistryEntry {
    /// Returns the handler name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the operator-facing description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the implementation.
    #[inline]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Returns the descriptor mirrored into the persisted catalog.
    pub fn descriptor(&self) -> HandlerDescriptor {
        HandlerDescriptor::new(&self.name, &self.description)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Catalog mapping handler names to implementations.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateHandler`] when the name is taken and
    /// [`ErrorKind::InvalidInput`] when it is empty. Both are startup
    /// failures: the process must not go on to serve traffic.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_input("handler name must not be empty"));
        }

        if self.entries.contains_key(&name) {
            return Err(Error::new(ErrorKind::DuplicateHandler)
                .with_message(format!("handler '{name}' is already registered")));
        }

        let entry = RegistryEntry {
            name: name.clone(),
            description: description.into(),
            handler: Arc::new(handler),
        };

        tracing::debug!(
            target: TRACING_TARGET_REGISTRY,
            handler = %name,
            "registered webhook handler"
        );

        self.entries.insert(name, entry);
        Ok(())
    }

    /// Looks up the implementation registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.entries.get(name).map(|entry| entry.handler.clone())
    }

    /// Returns the full entry registered under `name`.
    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Returns whether a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns all registered names.
    pub fn names(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the descriptors of all entries, ordered by name.
    pub fn descriptors(&self) -> Vec<HandlerDescriptor> {
        self.entries.values().map(RegistryEntry::descriptor).collect()
    }

    /// Iterates over all entries, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Returns the number of registered handlers.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no handler is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
