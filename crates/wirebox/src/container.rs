//! Instance container
//!
//! Holds every definition registered by the instantiation walk plus the
//! singleton instance cache, keyed by definition id. Definitions stay
//! immutable value descriptions; the "has it been built yet" fact lives
//! here with one clear owner. A cached singleton is never replaced within
//! the lifetime of the engine.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::definition::{DefinitionId, ProviderDefinition};
use crate::provider::SharedInstance;

pub struct BeanContainer {
    entries: RwLock<Vec<Arc<ProviderDefinition>>>,
    cache: RwLock<HashMap<DefinitionId, SharedInstance>>,
}

impl BeanContainer {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Register a definition in walk order
    pub fn register(&self, definition: Arc<ProviderDefinition>) {
        debug!(definition = %definition.short_string(), "definition registered");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(definition);
    }

    /// Snapshot of registered definitions in registration order
    pub fn definitions(&self) -> Vec<Arc<ProviderDefinition>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The cached singleton instance, when one exists
    pub fn cached(&self, id: DefinitionId) -> Option<SharedInstance> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Cache a singleton instance; set at most once, later calls keep the
    /// first value
    pub fn cache_instance(&self, definition: &ProviderDefinition, instance: SharedInstance) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(definition.id()).or_insert(instance);
        info!(definition = %definition.short_string(), "bean added");
    }
}
