//! # wirebox
//!
//! A declarative inversion-of-control engine. Components are described up
//! front as provider registrations; the engine wires them together in one
//! explicit build step that resolves the registrations into immutable
//! definitions, orders them over a dependency graph, and instantiates
//! them scope-aware.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Context                            │
//! │  bind(Binder) ... build() ... get_by_name / get_by_type /  │
//! │                               all_by_capability            │
//! └──────┬─────────────────────────────────────────────────────┘
//!        │ build()
//!        ▼
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ Binder      │──>│ Definition   │──>│ ContextGraph         │
//! │ (fluent)    │   │ registry     │   │ (topological order)  │
//! └─────────────┘   │ (priority)   │   └──────────┬───────────┘
//!                   └──────────────┘              │
//!        ┌────────────────────────────────────────┘
//!        ▼
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ Instantiator│──>│ BeanContainer│   │ Environment          │
//! │ (scopes)    │   │ (singletons) │   │ (property sources)   │
//! └─────────────┘   └──────────────┘   └──────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::{Binder, Context};
//!
//! struct Config { url: String }
//! struct Client { config: Arc<Config> }
//!
//! let mut ctx = Context::new();
//! ctx.bind(
//!     Binder::new()
//!         .qualifier("config")
//!         .depends_on_value_or::<String>("db.url", "localhost:5432")
//!         .factory(|args| Ok(Config { url: args.take_value::<String>()? })),
//! );
//! ctx.bind(
//!     Binder::new()
//!         .depends_on::<Config>()
//!         .factory(|args| Ok(Client { config: args.take::<Config>()? })),
//! );
//! ctx.build().unwrap();
//!
//! let client = ctx.get_by_type::<Client>().unwrap();
//! assert_eq!(client.config.url, "localhost:5432");
//! ```

pub mod binder;
pub mod context;
pub mod definition;
pub mod dependency;
pub mod environment;
pub mod error;
pub mod key;
pub mod priority;
pub mod processor;
pub mod provider;
pub mod scope;

mod container;
mod graph;
mod registry;
mod resolver;

pub use binder::Binder;
pub use context::{Context, ContextHandle, ContextState};
pub use dependency::ValueBinding;
pub use environment::{Environment, EnvironmentPrinter, MapPropertySource, PropertySource};
pub use error::{Error, Result};
pub use key::{BindKey, CapabilityId, TypeIdentity};
pub use processor::PostProcessor;
pub use provider::{Capability, Provider, ProviderArgs, SharedInstance};
pub use scope::Scope;
