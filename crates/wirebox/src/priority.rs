//! Well-known registration priorities
//!
//! Higher priority sorts earlier in the registry, which also makes it the
//! tie-break for construction order among structurally independent beans.
//! The reserved bands keep engine bootstrap beans and property sources
//! ahead of ordinary registrations.

/// Default priority for ordinary registrations
pub const DEFAULT_PRIORITY: i32 = 0;

/// Priority of the engine's own context-handle bootstrap bean
pub const CONTEXT_PRIORITY: i32 = 1_000_000;

/// Upper bound of the reserved property-source band
pub const PROPERTY_SOURCE_HIGHEST_PRIORITY: i32 = 900_000;

/// Lower bound of the reserved property-source band
pub const PROPERTY_SOURCE_LOWEST_PRIORITY: i32 = 899_000;

/// Priority of the environment bootstrap bean
pub const ENVIRONMENT_PRIORITY: i32 = 800_000;

/// Highest priority available to user registrations
pub const HIGHEST_PRIORITY: i32 = 500_000;

/// Lowest priority available to user registrations
pub const LOWEST_PRIORITY: i32 = -500_000;
