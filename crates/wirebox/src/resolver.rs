//! Scope-aware instance resolution
//!
//! The instantiator resolves one definition's arguments against the
//! instance container (bean-kind) and the environment (value-kind), then
//! invokes the factory. Singleton requests are served from the cache once
//! it is warm; prototype requests invoke the factory unconditionally, so
//! a prototype is constructed on demand and once per dependent.
//!
//! Uniqueness is enforced here, at the point a concrete instance must be
//! chosen: zero suitable definitions is `UnsatisfiedDependency`, more
//! than one is `AmbiguousDependency` - even though the graph legally
//! fanned out over every candidate when its edges were built.

use std::sync::Arc;

use crate::container::BeanContainer;
use crate::definition::ProviderDefinition;
use crate::dependency::{parse_property, BeanTarget, Dependency, DependencyKind, ValueBinding};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::provider::{ProviderArgs, SharedInstance};
use crate::scope::Scope;

pub(crate) struct Instantiator<'a> {
    beans: &'a BeanContainer,
    environment: &'a Environment,
}

impl<'a> Instantiator<'a> {
    pub(crate) fn new(beans: &'a BeanContainer, environment: &'a Environment) -> Self {
        Self { beans, environment }
    }

    /// Produce an instance honoring the definition's scope
    pub(crate) fn instance_of(&self, definition: &Arc<ProviderDefinition>) -> Result<SharedInstance> {
        match definition.scope() {
            Scope::Singleton => {
                if let Some(cached) = self.beans.cached(definition.id()) {
                    return Ok(cached);
                }
                // the walk visits dependencies first, so during the build
                // this miss only happens at the definition's own walk step
                let instance = self.construct(definition)?;
                self.beans.cache_instance(definition, instance.clone());
                Ok(instance)
            }
            Scope::Prototype => self.construct(definition),
        }
    }

    /// Resolve arguments and invoke the factory once
    fn construct(&self, definition: &Arc<ProviderDefinition>) -> Result<SharedInstance> {
        let args = self.resolve_arguments(definition)?;
        definition.provider().call(args).map_err(|e| match e {
            shape @ Error::InvalidProviderShape { .. } => shape,
            failure => Error::construction_failed(definition.short_string(), failure),
        })
    }

    fn resolve_arguments(&self, definition: &Arc<ProviderDefinition>) -> Result<ProviderArgs> {
        let mut values = Vec::with_capacity(definition.dependencies().len());
        for dependency in definition.dependencies() {
            let value = match dependency.kind() {
                DependencyKind::Bean { .. } => self.resolve_bean(definition, dependency)?,
                DependencyKind::Value { binding } => {
                    self.resolve_value(definition, dependency, binding)?
                }
            };
            values.push(value);
        }
        Ok(ProviderArgs::new(values))
    }

    /// Exactly one registered definition may match
    fn resolve_bean(
        &self,
        owner: &Arc<ProviderDefinition>,
        dependency: &Dependency,
    ) -> Result<SharedInstance> {
        let definitions = self.beans.definitions();
        let candidates: Vec<&Arc<ProviderDefinition>> = definitions
            .iter()
            .filter(|candidate| candidate.suitable_for(dependency))
            .collect();
        match candidates.as_slice() {
            [] => Err(Error::unsatisfied_dependency(
                dependency.to_string(),
                owner.short_string(),
            )),
            [only] => {
                let instance = self.instance_of(only)?;
                // a capability-targeted argument is delivered as the trait
                // object, not the erased concrete instance
                if let DependencyKind::Bean {
                    target: BeanTarget::Capability(id),
                } = dependency.kind()
                {
                    return only
                        .capability(*id)
                        .and_then(|capability| capability.shared(&instance))
                        .ok_or_else(|| {
                            Error::unsatisfied_dependency(
                                dependency.to_string(),
                                owner.short_string(),
                            )
                        });
                }
                Ok(instance)
            }
            many => Err(Error::ambiguous_dependency(
                dependency.to_string(),
                owner.short_string(),
                many.iter()
                    .map(|candidate| candidate.short_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }

    /// Environment lookup, default fallback, then primitive parsing
    fn resolve_value(
        &self,
        owner: &Arc<ProviderDefinition>,
        dependency: &Dependency,
        binding: &ValueBinding,
    ) -> Result<SharedInstance> {
        let raw = match self.environment.lookup(binding.key()) {
            Some(value) => value,
            None => match binding.default() {
                Some(default) => default.to_string(),
                None => {
                    return Err(Error::missing_property(
                        binding.key(),
                        owner.short_string(),
                    ));
                }
            },
        };
        parse_property(dependency.declared(), binding.key(), &raw)
    }
}
