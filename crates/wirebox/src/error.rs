//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the wirebox engine
///
/// Build-time errors carry the offending registration's identity
/// (qualifiers + produced type) so a failed build names its culprit.
#[derive(Error, Debug)]
pub enum Error {
    /// Registration has an invalid factory shape (missing factory, wrong
    /// argument consumption, malformed value expression)
    #[error("invalid provider shape: {message}")]
    InvalidProviderShape {
        /// Description of the shape violation
        message: String,
    },

    /// A bean-kind dependency has no suitable provider definition
    #[error("unsatisfied dependency {dependency} of {definition}")]
    UnsatisfiedDependency {
        /// The dependency that could not be satisfied
        dependency: String,
        /// The definition that declared the dependency
        definition: String,
    },

    /// More than one provider definition is suitable where exactly one
    /// instance must be chosen
    #[error("ambiguous dependency {dependency} of {definition}: candidates [{candidates}]")]
    AmbiguousDependency {
        /// The dependency that matched multiple candidates
        dependency: String,
        /// The definition that declared the dependency
        definition: String,
        /// The competing candidate definitions
        candidates: String,
    },

    /// The dependency graph contains a cycle
    #[error("cyclic dependency detected at {definition}")]
    CyclicDependency {
        /// A definition participating in the cycle
        definition: String,
    },

    /// A value-kind dependency is absent from every property source and
    /// declares no default
    #[error("missing property '{key}' required by {definition}")]
    MissingProperty {
        /// The property key that was looked up
        key: String,
        /// The definition that declared the value dependency
        definition: String,
    },

    /// A property value exists but cannot be parsed into the declared type
    #[error("property '{key}' value '{value}' cannot be parsed as {target}")]
    PropertyTypeMismatch {
        /// The property key that was looked up
        key: String,
        /// The raw property value
        value: String,
        /// The declared target type
        target: String,
        /// The underlying parse error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider factory reported failure; the whole build aborts
    #[error("construction of {definition} failed: {source}")]
    ConstructionFailed {
        /// The definition whose factory failed
        definition: String,
        /// The factory's reported error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Lookup miss; non-fatal by contract
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Operation invoked in the wrong engine state (e.g. a second build)
    #[error("invalid context state: {message}")]
    InvalidState {
        /// Description of the state violation
        message: String,
    },
}

impl Error {
    /// Create an invalid provider shape error
    pub fn invalid_provider_shape<S: Into<String>>(message: S) -> Self {
        Self::InvalidProviderShape {
            message: message.into(),
        }
    }

    /// Create an unsatisfied dependency error
    pub fn unsatisfied_dependency<D: Into<String>, O: Into<String>>(
        dependency: D,
        definition: O,
    ) -> Self {
        Self::UnsatisfiedDependency {
            dependency: dependency.into(),
            definition: definition.into(),
        }
    }

    /// Create an ambiguous dependency error
    pub fn ambiguous_dependency<D: Into<String>, O: Into<String>, C: Into<String>>(
        dependency: D,
        definition: O,
        candidates: C,
    ) -> Self {
        Self::AmbiguousDependency {
            dependency: dependency.into(),
            definition: definition.into(),
            candidates: candidates.into(),
        }
    }

    /// Create a cyclic dependency error
    pub fn cyclic_dependency<S: Into<String>>(definition: S) -> Self {
        Self::CyclicDependency {
            definition: definition.into(),
        }
    }

    /// Create a missing property error
    pub fn missing_property<K: Into<String>, D: Into<String>>(key: K, definition: D) -> Self {
        Self::MissingProperty {
            key: key.into(),
            definition: definition.into(),
        }
    }

    /// Create a property type mismatch error
    pub fn property_type_mismatch<K: Into<String>, V: Into<String>, T: Into<String>>(
        key: K,
        value: V,
        target: T,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::PropertyTypeMismatch {
            key: key.into(),
            value: value.into(),
            target: target.into(),
            source,
        }
    }

    /// Create a construction failure wrapping the factory's error
    pub fn construction_failed<D: Into<String>, E>(definition: D, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::ConstructionFailed {
            definition: definition.into(),
            source: source.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}
