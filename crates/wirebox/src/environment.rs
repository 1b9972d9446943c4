//! Environment and property sources
//!
//! The environment is the ordered set of configuration-value sources
//! backing value-kind dependencies. Sources are discovered as a side
//! effect of instantiation: any singleton declaring the
//! `dyn PropertySource` capability is appended in construction order.
//!
//! Point lookups and enumeration deliberately disagree on precedence:
//! `get_property` returns the match from the *first* source in order,
//! while `get_all_properties` merges with *later* sources overriding
//! earlier ones on key collision. This asymmetry is part of the contract.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::context::ContextHandle;
use crate::error::{Error, Result};
use crate::processor::PostProcessor;

/// An abstract key-value configuration source
pub trait PropertySource: Send + Sync {
    /// Every key-value pair this source holds
    fn get_all(&self) -> HashMap<String, String>;

    /// The value for `key`, when present
    fn get(&self, key: &str) -> Option<String>;

    /// The value for `key`, or the given default
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// In-memory property source backed by a map
pub struct MapPropertySource {
    properties: HashMap<String, String>,
}

impl MapPropertySource {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Build from `(key, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertySource for MapPropertySource {
    fn get_all(&self) -> HashMap<String, String> {
        self.properties.clone()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }
}

/// The ordered set of property sources
pub struct Environment {
    sources: RwLock<Vec<Arc<dyn PropertySource>>>,
}

impl Environment {
    pub(crate) fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_property_source(&self, source: Arc<dyn PropertySource>, definition: &str) {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(source);
        info!(definition, "property source added");
    }

    /// First source in order with a match
    pub(crate) fn lookup(&self, key: &str) -> Option<String> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find_map(|source| source.get(key))
    }

    /// The value for `key` from the first source that contains it
    pub fn get_property(&self, key: &str) -> Result<String> {
        self.lookup(key)
            .ok_or_else(|| Error::not_found(format!("property '{key}'")))
    }

    /// The value for `key`, or the given default
    pub fn get_property_or_default(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    /// Merge of all sources; later sources override earlier ones per key.
    /// Note the asymmetry with [`get_property`](Self::get_property), which
    /// prefers the first source.
    pub fn get_all_properties(&self) -> HashMap<String, String> {
        let mut merged = HashMap::new();
        for source in self
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            merged.extend(source.get_all());
        }
        merged
    }
}

/// Post-processor that logs every merged property after the build
pub struct EnvironmentPrinter;

impl PostProcessor for EnvironmentPrinter {
    fn post_process(&self, ctx: &ContextHandle) -> Result<()> {
        for (key, value) in ctx.environment().get_all_properties() {
            info!(key = %key, value = %value, "found property");
        }
        Ok(())
    }
}
