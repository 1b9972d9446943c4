//! The engine: registration collection, build pipeline, lookups
//!
//! ## Build pipeline
//!
//! ```text
//! bootstrap registrations (context handle, environment)
//!         │
//! flatten nested binders ──> resolve into definitions ──> registry
//!         │                                          (priority order)
//!         ▼
//! dependency graph (nodes, edges, topological sort)
//!         │
//!         ▼
//! instantiation walk (singletons constructed & cached, prototypes
//! registered for on-demand construction; property sources and post
//! processors routed as a side effect)
//!         │
//!         ▼
//! post-processor pass ──> Built
//! ```
//!
//! `build()` is single-shot: `Unbuilt → Building → Built` or
//! `Unbuilt → Building → Failed`, both terminal. Any failure aborts the
//! whole sequence; a failed engine exposes no container.

use std::sync::Arc;

use tracing::{info, warn};

use crate::binder::Binder;
use crate::container::BeanContainer;
use crate::definition::{DefinitionId, ProviderDefinition};
use crate::environment::{Environment, PropertySource};
use crate::error::{Error, Result};
use crate::graph::ContextGraph;
use crate::key::{CapabilityId, TypeIdentity};
use crate::priority::{CONTEXT_PRIORITY, ENVIRONMENT_PRIORITY};
use crate::processor::{PostProcessor, PostProcessorContainer};
use crate::provider::SharedInstance;
use crate::registry::DefinitionContainer;
use crate::resolver::Instantiator;
use crate::scope::Scope;

/// Engine lifecycle states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// Accepting registrations
    Unbuilt,
    /// Build pipeline in flight
    Building,
    /// Terminal: container usable
    Built,
    /// Terminal: container unusable
    Failed,
}

/// Shared lookup surface over the built container.
///
/// Registered as an ordinary bootstrap bean under the `"context"`
/// qualifier so providers and post-processors can depend on the engine
/// itself. Cheap to clone.
#[derive(Clone)]
pub struct ContextHandle {
    beans: Arc<BeanContainer>,
    environment: Arc<Environment>,
}

impl ContextHandle {
    /// Exactly one definition whose qualifiers contain `name`, else
    /// `NotFound`. Prototype-scoped hits construct a fresh instance.
    pub fn get_by_name<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        let definitions = self.beans.definitions();
        let matches: Vec<&Arc<ProviderDefinition>> = definitions
            .iter()
            .filter(|definition| definition.key().has_qualifier(name))
            .collect();
        let [definition] = matches.as_slice() else {
            return Err(Error::not_found(format!(
                "bean named '{name}' ({} candidates)",
                matches.len()
            )));
        };
        let instance = Instantiator::new(&self.beans, &self.environment).instance_of(definition)?;
        instance.downcast::<T>().map_err(|_| {
            Error::not_found(format!(
                "bean named '{name}' is not of type {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// First definition whose produced type equals `T` exactly; `None` on
    /// miss (non-error by design, asymmetric with name lookup)
    pub fn get_by_type<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let target = TypeIdentity::of::<T>();
        let definition = self
            .beans
            .definitions()
            .into_iter()
            .find(|definition| definition.key().produced() == target)?;
        match Instantiator::new(&self.beans, &self.environment).instance_of(&definition) {
            Ok(instance) => instance.downcast::<T>().ok(),
            Err(e) => {
                warn!(definition = %definition.short_string(), error = %e, "type lookup failed");
                None
            }
        }
    }

    /// Every instance whose definition declares capability `C`; an empty
    /// result is valid
    pub fn all_by_capability<C: ?Sized + 'static>(&self) -> Vec<Arc<C>> {
        let id = CapabilityId::of::<C>();
        let instantiator = Instantiator::new(&self.beans, &self.environment);
        let mut found = Vec::new();
        for definition in self.beans.definitions() {
            let Some(capability) = definition.capability(id) else {
                continue;
            };
            match instantiator.instance_of(&definition) {
                Ok(instance) => {
                    if let Some(value) = capability.extract::<C>(&instance) {
                        found.push(value);
                    }
                }
                Err(e) => {
                    warn!(definition = %definition.short_string(), error = %e, "capability lookup failed");
                }
            }
        }
        found
    }

    /// The engine's environment
    pub fn environment(&self) -> Arc<Environment> {
        self.environment.clone()
    }
}

/// The inversion-of-control engine
pub struct Context {
    state: ContextState,
    binders: Vec<Binder>,
    beans: Arc<BeanContainer>,
    environment: Arc<Environment>,
    post_processors: PostProcessorContainer,
    handle: ContextHandle,
}

impl Context {
    pub fn new() -> Self {
        let beans = Arc::new(BeanContainer::new());
        let environment = Arc::new(Environment::new());
        let handle = ContextHandle {
            beans: beans.clone(),
            environment: environment.clone(),
        };
        let mut context = Self {
            state: ContextState::Unbuilt,
            binders: Vec::new(),
            beans,
            environment,
            post_processors: PostProcessorContainer::new(),
            handle,
        };
        context.register_bootstrap();
        context
    }

    /// The engine and its environment are ordinary registrations, so any
    /// provider may depend on them by type or by name.
    fn register_bootstrap(&mut self) {
        let handle = self.handle.clone();
        self.binders.push(
            Binder::new()
                .qualifier("context")
                .priority(CONTEXT_PRIORITY)
                .factory(move |_| Ok(handle.clone())),
        );
        let environment = self.environment.clone();
        self.binders.push(
            Binder::new()
                .qualifier("environment")
                .priority(ENVIRONMENT_PRIORITY)
                .factory_shared(move |_| Ok(environment.clone())),
        );
    }

    /// Add a registration. Only binders present when [`build`](Self::build)
    /// runs are ever resolved.
    pub fn bind(&mut self, binder: Binder) -> &mut Self {
        self.binders.push(binder);
        self
    }

    /// Run the build pipeline once. Terminal either way; calling again is
    /// rejected.
    pub fn build(&mut self) -> Result<()> {
        if self.state != ContextState::Unbuilt {
            return Err(Error::invalid_state(format!(
                "build already attempted (state: {:?})",
                self.state
            )));
        }
        self.state = ContextState::Building;
        match self.run_build() {
            Ok(()) => {
                self.state = ContextState::Built;
                info!("context built");
                Ok(())
            }
            Err(e) => {
                self.state = ContextState::Failed;
                Err(e)
            }
        }
    }

    fn run_build(&mut self) -> Result<()> {
        let mut flat = Vec::new();
        for binder in std::mem::take(&mut self.binders) {
            binder.flatten(&mut flat);
        }

        let mut definitions = DefinitionContainer::new();
        for (id, binder) in flat.into_iter().enumerate() {
            definitions.add(Arc::new(binder.resolve(id as DefinitionId)?));
        }
        info!(count = definitions.len(), "registrations resolved");

        let mut graph = ContextGraph::new();
        graph.build(&definitions)?;

        self.instantiate(&graph)?;
        self.run_post_processors()
    }

    /// Walk the sorted definitions once. Singletons are constructed and
    /// cached here; prototypes are only registered, their construction
    /// happens per request.
    fn instantiate(&self, graph: &ContextGraph) -> Result<()> {
        let instantiator = Instantiator::new(&self.beans, &self.environment);
        for definition in graph.iter_sorted() {
            self.beans.register(definition.clone());
            if definition.scope() != Scope::Singleton {
                continue;
            }
            let instance = instantiator.instance_of(&definition)?;
            self.route_capabilities(&definition, &instance);
        }
        Ok(())
    }

    /// Side effect of instantiation: feed matching instances into the
    /// environment's source list and the post-processor set
    fn route_capabilities(&self, definition: &Arc<ProviderDefinition>, instance: &SharedInstance) {
        if let Some(capability) = definition.capability(CapabilityId::of::<dyn PropertySource>()) {
            if let Some(source) = capability.extract::<dyn PropertySource>(instance) {
                self.environment
                    .add_property_source(source, &definition.short_string());
            }
        }
        if let Some(capability) = definition.capability(CapabilityId::of::<dyn PostProcessor>()) {
            if let Some(processor) = capability.extract::<dyn PostProcessor>(instance) {
                self.post_processors
                    .add(processor, &definition.short_string());
            }
        }
    }

    fn run_post_processors(&self) -> Result<()> {
        for processor in self.post_processors.snapshot() {
            processor.post_process(&self.handle)?;
        }
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// See [`ContextHandle::get_by_name`]; requires `Built`
    pub fn get_by_name<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        self.require_built()?;
        self.handle.get_by_name(name)
    }

    /// See [`ContextHandle::get_by_type`]; `None` unless `Built`
    pub fn get_by_type<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        if self.state != ContextState::Built {
            return None;
        }
        self.handle.get_by_type::<T>()
    }

    /// See [`ContextHandle::all_by_capability`]; empty unless `Built`
    pub fn all_by_capability<C: ?Sized + 'static>(&self) -> Vec<Arc<C>> {
        if self.state != ContextState::Built {
            return Vec::new();
        }
        self.handle.all_by_capability::<C>()
    }

    /// The engine's environment
    pub fn environment(&self) -> Arc<Environment> {
        self.environment.clone()
    }

    /// A cheap shared lookup handle over the container
    pub fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    fn require_built(&self) -> Result<()> {
        if self.state == ContextState::Built {
            Ok(())
        } else {
            Err(Error::invalid_state(format!(
                "context is not built (state: {:?})",
                self.state
            )))
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
