//! Provider definition registry
//!
//! Ordered collection of resolved definitions, kept priority-descending at
//! insertion time with a stable tie-break: equal priorities stay in
//! insertion order. Iteration is a plain restartable traversal.

use std::sync::Arc;

use crate::definition::ProviderDefinition;

pub struct DefinitionContainer {
    ls: Vec<Arc<ProviderDefinition>>,
}

impl DefinitionContainer {
    pub fn new() -> Self {
        Self { ls: Vec::new() }
    }

    /// Insert before the first strictly-lower priority entry
    pub fn add(&mut self, definition: Arc<ProviderDefinition>) {
        let position = self
            .ls
            .iter()
            .position(|existing| existing.priority() < definition.priority())
            .unwrap_or(self.ls.len());
        self.ls.insert(position, definition);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProviderDefinition>> {
        self.ls.iter()
    }

    pub fn len(&self) -> usize {
        self.ls.len()
    }
}
