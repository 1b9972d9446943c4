//! Bean lifetime scopes

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Lifetime policy for a provided value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    /// One shared instance, constructed during the build walk and cached
    #[default]
    Singleton,
    /// A fresh instance per construction request, never cached
    Prototype,
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "prototype" => Ok(Self::Prototype),
            _ => Err(Error::invalid_provider_shape(format!(
                "cannot parse bean scope from string '{s}'"
            ))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("Singleton"),
            Self::Prototype => f.write_str("Prototype"),
        }
    }
}
