use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A service definition as seen by the host container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Concrete type the service resolves to
    pub class: String,
    /// Whether constructor arguments are wired automatically
    pub autowired: bool,
    /// Whether the service may be fetched directly from the container
    pub public: bool,
}

impl ServiceDefinition {
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            autowired: false,
            public: false,
        }
    }
}

/// Interface of the host dependency-injection container.
///
/// The kernel only needs to check, register and flag definitions; building
/// and resolving services stays with the host. Methods take `&self` so a
/// container can be shared with lifecycle hooks behind an `Arc`.
pub trait ServiceContainer: Send + Sync + Debug {
    /// Check whether a definition exists for the service id
    fn has(&self, id: &str) -> bool;

    /// Register a definition, replacing any existing one
    fn register(&self, id: &str, definition: ServiceDefinition);

    /// Flag a definition as autowired. Returns false if it does not exist.
    fn set_autowired(&self, id: &str, autowired: bool) -> bool;

    /// Flag a definition as public. Returns false if it does not exist.
    fn set_public(&self, id: &str, public: bool) -> bool;

    /// Snapshot of a definition
    fn definition(&self, id: &str) -> Option<ServiceDefinition>;
}

/// In-memory container holding bare definitions
#[derive(Debug, Default)]
pub struct DefinitionContainer {
    definitions: Mutex<BTreeMap<String, ServiceDefinition>>,
}

impl DefinitionContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all registered definitions, sorted
    pub fn ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, ServiceDefinition>> {
        // Definitions stay consistent even if a holder panicked mid-update
        self.definitions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ServiceContainer for DefinitionContainer {
    fn has(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    fn register(&self, id: &str, definition: ServiceDefinition) {
        self.lock().insert(id.to_string(), definition);
    }

    fn set_autowired(&self, id: &str, autowired: bool) -> bool {
        match self.lock().get_mut(id) {
            Some(definition) => {
                definition.autowired = autowired;
                true
            }
            None => false,
        }
    }

    fn set_public(&self, id: &str, public: bool) -> bool {
        match self.lock().get_mut(id) {
            Some(definition) => {
                definition.public = public;
                true
            }
            None => false,
        }
    }

    fn definition(&self, id: &str) -> Option<ServiceDefinition> {
        self.lock().get(id).cloned()
    }
}
