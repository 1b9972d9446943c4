//! Resolved provider definitions and the type/qualifier matcher
//!
//! A definition is the immutable result of resolving a registration:
//! bind key, ordered dependency descriptors, scope, priority, factory and
//! declared capabilities. All mutable build state (the singleton cache,
//! the graph index) lives elsewhere, keyed by the definition id.

use std::fmt;

use crate::dependency::{BeanTarget, Dependency, DependencyKind};
use crate::key::{BindKey, CapabilityId};
use crate::provider::{Capability, Provider};
use crate::scope::Scope;

/// Unique identity of a definition within one engine, assigned at
/// registration resolution
pub type DefinitionId = usize;

/// An immutable, fully resolved registration
pub struct ProviderDefinition {
    id: DefinitionId,
    key: BindKey,
    dependencies: Vec<Dependency>,
    scope: Scope,
    priority: i32,
    provider: Provider,
    capabilities: Vec<Capability>,
}

impl ProviderDefinition {
    pub(crate) fn new(
        id: DefinitionId,
        key: BindKey,
        dependencies: Vec<Dependency>,
        scope: Scope,
        priority: i32,
        provider: Provider,
        capabilities: Vec<Capability>,
    ) -> Self {
        Self {
            id,
            key,
            dependencies,
            scope,
            priority,
            provider,
            capabilities,
        }
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn key(&self) -> &BindKey {
        &self.key
    }

    /// Dependency descriptors in positional order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn provider(&self) -> &Provider {
        &self.provider
    }

    /// The capability declaration for `id`, when this definition made one
    pub fn capability(&self, id: CapabilityId) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.id() == id)
    }

    /// Qualifier rule: the descriptor's qualifier must appear in this
    /// definition's qualifier set
    fn suitable_by_qualifier(&self, dependency: &Dependency) -> bool {
        match dependency.qualifier() {
            Some(qualifier) => self.key.has_qualifier(qualifier),
            None => false,
        }
    }

    /// Type rule: exact produced-type equality for concrete targets, a
    /// declared capability for capability targets
    fn suitable_by_type(&self, dependency: &Dependency) -> bool {
        match dependency.kind() {
            DependencyKind::Bean { target } => match target {
                BeanTarget::Concrete(identity) => self.key.produced() == *identity,
                BeanTarget::Capability(capability) => self.capability(*capability).is_some(),
            },
            DependencyKind::Value { .. } => false,
        }
    }

    /// Composite rule: the type rule always applies; the qualifier rule
    /// applies only when the descriptor carries a qualifier
    pub(crate) fn suitable_for(&self, dependency: &Dependency) -> bool {
        if !self.suitable_by_type(dependency) {
            return false;
        }
        match dependency.qualifier() {
            Some(_) => self.suitable_by_qualifier(dependency),
            None => true,
        }
    }

    /// Compact identity used in error and log messages
    pub fn short_string(&self) -> String {
        format!("Definition{{{}}}", self.key)
    }
}

impl fmt::Debug for ProviderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ProviderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deps: Vec<String> = self.dependencies.iter().map(|d| d.to_string()).collect();
        write!(
            f,
            "Definition{{{}:{}:[{}]}}",
            self.key,
            self.scope,
            deps.join(",")
        )
    }
}
