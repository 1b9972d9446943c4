//! Fluent registration builder
//!
//! A [`Binder`] accumulates qualifiers, scope, priority, capability
//! declarations, dependency declarations and the factory, then resolves
//! into an immutable [`ProviderDefinition`] during the build. Dependencies
//! are declared as explicit builder calls; declaration order assigns the
//! positional indices the factory consumes through
//! [`ProviderArgs`](crate::provider::ProviderArgs).
//!
//! A binder may also carry nested binders discovered from its own
//! registration unit; they are flattened recursively (parent first) when
//! the engine collects registrations.

use std::fmt;
use std::sync::Arc;

use crate::definition::{DefinitionId, ProviderDefinition};
use crate::dependency::{BeanTarget, Dependency, ValueBinding};
use crate::error::{Error, Result};
use crate::key::{BindKey, CapabilityId, TypeIdentity};
use crate::priority::DEFAULT_PRIORITY;
use crate::provider::{Capability, Provider, ProviderArgs};
use crate::scope::Scope;

/// Fluent accumulation of one registration
pub struct Binder {
    qualifiers: Vec<String>,
    scope: Scope,
    priority: i32,
    provider: Option<Provider>,
    capabilities: Vec<Capability>,
    dependencies: Vec<Dependency>,
    nested: Vec<Binder>,
    // first builder-time error, surfaced when the registration resolves
    invalid: Option<Error>,
}

impl Binder {
    pub fn new() -> Self {
        Self {
            qualifiers: Vec::new(),
            scope: Scope::Singleton,
            priority: DEFAULT_PRIORITY,
            provider: None,
            capabilities: Vec::new(),
            dependencies: Vec::new(),
            nested: Vec::new(),
            invalid: None,
        }
    }

    /// Append one qualifier label
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.push(qualifier.into());
        self
    }

    /// Replace the qualifier set
    pub fn qualifiers<I>(mut self, qualifiers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.qualifiers = qualifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the lifetime scope (default: singleton)
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the registry priority (default: 0); higher sorts earlier
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the construction function producing a `T` by value
    pub fn factory<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ProviderArgs) -> Result<T> + Send + Sync + 'static,
    {
        self.provider = Some(Provider::new(factory));
        self
    }

    /// Set a construction function producing an already-shared `Arc<T>`
    pub fn factory_shared<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ProviderArgs) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.provider = Some(Provider::from_shared(factory));
        self
    }

    /// Declare that the produced value implements a capability
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Declare a bean-kind dependency matched by exact type
    pub fn depends_on<T: ?Sized + 'static>(mut self) -> Self {
        let index = self.next_index();
        self.dependencies.push(Dependency::bean(
            None,
            BeanTarget::Concrete(TypeIdentity::of::<T>()),
            TypeIdentity::of::<T>(),
            index,
        ));
        self
    }

    /// Declare a bean-kind dependency matched by exact type and qualifier
    pub fn depends_on_named<T: ?Sized + 'static>(mut self, qualifier: impl Into<String>) -> Self {
        let index = self.next_index();
        self.dependencies.push(Dependency::bean(
            Some(qualifier.into()),
            BeanTarget::Concrete(TypeIdentity::of::<T>()),
            TypeIdentity::of::<T>(),
            index,
        ));
        self
    }

    /// Declare a bean-kind dependency on any implementor of capability `C`
    pub fn depends_on_capability<C: ?Sized + 'static>(mut self) -> Self {
        let index = self.next_index();
        self.dependencies.push(Dependency::bean(
            None,
            BeanTarget::Capability(CapabilityId::of::<C>()),
            TypeIdentity::of::<C>(),
            index,
        ));
        self
    }

    /// Declare a bean-kind dependency on a qualified implementor of `C`
    pub fn depends_on_capability_named<C: ?Sized + 'static>(
        mut self,
        qualifier: impl Into<String>,
    ) -> Self {
        let index = self.next_index();
        self.dependencies.push(Dependency::bean(
            Some(qualifier.into()),
            BeanTarget::Capability(CapabilityId::of::<C>()),
            TypeIdentity::of::<C>(),
            index,
        ));
        self
    }

    /// Declare a value-kind dependency on a property key, no default
    pub fn depends_on_value<T: 'static>(self, key: impl Into<String>) -> Self {
        self.push_value::<T>(ValueBinding::new(key))
    }

    /// Declare a value-kind dependency with a default used when no
    /// property source matches
    pub fn depends_on_value_or<T: 'static>(
        self,
        key: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.push_value::<T>(ValueBinding::with_default(key, default))
    }

    /// Declare a value-kind dependency from a `${key[:default]}` expression
    pub fn depends_on_value_expr<T: 'static>(mut self, expr: &str) -> Self {
        match ValueBinding::parse(expr) {
            Ok(binding) => self.push_value::<T>(binding),
            Err(e) => {
                self.invalid.get_or_insert(e);
                self
            }
        }
    }

    /// Attach a nested registration resolved together with this one
    pub fn nested(mut self, binder: Binder) -> Self {
        self.nested.push(binder);
        self
    }

    fn push_value<T: 'static>(mut self, binding: ValueBinding) -> Self {
        let index = self.next_index();
        self.dependencies
            .push(Dependency::value(binding, TypeIdentity::of::<T>(), index));
        self
    }

    fn next_index(&self) -> u16 {
        self.dependencies.len() as u16
    }

    /// Flatten this binder and its nested binders, parent first
    pub(crate) fn flatten(mut self, out: &mut Vec<Binder>) {
        let nested = std::mem::take(&mut self.nested);
        out.push(self);
        for child in nested {
            child.flatten(out);
        }
    }

    /// Resolve into an immutable definition; validates the provider shape
    pub(crate) fn resolve(mut self, id: DefinitionId) -> Result<ProviderDefinition> {
        if let Some(invalid) = self.invalid.take() {
            return Err(invalid);
        }
        let provider = self.provider.ok_or_else(|| {
            Error::invalid_provider_shape(format!(
                "registration [{}] has no factory",
                self.qualifiers.join(",")
            ))
        })?;
        let key = BindKey::new(self.qualifiers, provider.produced());
        Ok(ProviderDefinition::new(
            id,
            key,
            self.dependencies,
            self.scope,
            self.priority,
            provider,
            self.capabilities,
        ))
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Binder{{{}:{}:[{}]}}",
            self.priority,
            self.scope,
            self.qualifiers.join(",")
        )
    }
}
