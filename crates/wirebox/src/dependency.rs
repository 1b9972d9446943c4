//! Dependency descriptors
//!
//! One descriptor per required input of a provider. A dependency is either
//! bean-kind (satisfied by another provider, matched by type/capability and
//! optionally a qualifier) or value-kind (satisfied by a configuration
//! property, parsed into a declared primitive type). The enum makes
//! "exactly one of the two" structural.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::key::{CapabilityId, TypeIdentity};
use crate::provider::SharedInstance;

/// Separator between key and default in a value expression
const VALUE_EXPR_SEP: char = ':';
/// Prefix of a value expression
const VALUE_EXPR_PREFIX: &str = "${";
/// Suffix of a value expression
const VALUE_EXPR_SUFFIX: &str = "}";

/// Binding of a value-kind dependency to a property key, with an optional
/// literal default
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueBinding {
    key: String,
    default: Option<String>,
}

impl ValueBinding {
    /// Bind to a property key with no default
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
        }
    }

    /// Bind to a property key with a default used when no source matches
    pub fn with_default(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: Some(default.into()),
        }
    }

    /// Parse the `${key[:default]}` expression grammar.
    ///
    /// Everything after the first `:` is the literal default text, further
    /// separators included: `${url:http://host:8080}` defaults to
    /// `http://host:8080`.
    pub fn parse(expr: &str) -> Result<Self> {
        let inner = expr
            .strip_prefix(VALUE_EXPR_PREFIX)
            .and_then(|rest| rest.strip_suffix(VALUE_EXPR_SUFFIX))
            .ok_or_else(|| {
                Error::invalid_provider_shape(format!(
                    "value expression '{expr}' must have the form ${{key[:default]}}"
                ))
            })?;
        let (key, default) = match inner.split_once(VALUE_EXPR_SEP) {
            Some((key, default)) => (key, Some(default.to_string())),
            None => (inner, None),
        };
        if key.is_empty() {
            return Err(Error::invalid_provider_shape(format!(
                "value expression '{expr}' has an empty property key"
            )));
        }
        Ok(Self {
            key: key.to_string(),
            default,
        })
    }

    /// The property key queried against the environment
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The literal default text, if declared
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// What a bean-kind dependency matches against
#[derive(Clone, Copy, Debug)]
pub enum BeanTarget {
    /// Exact produced-type equality
    Concrete(TypeIdentity),
    /// Any provider declaring the capability
    Capability(CapabilityId),
}

/// The two dependency kinds
#[derive(Clone, Debug)]
pub enum DependencyKind {
    /// Satisfied by another provider's instance
    Bean {
        /// The matching target
        target: BeanTarget,
    },
    /// Satisfied by a configuration property
    Value {
        /// The property binding
        binding: ValueBinding,
    },
}

/// One required input of a provider
#[derive(Clone, Debug)]
pub struct Dependency {
    qualifier: Option<String>,
    kind: DependencyKind,
    declared: TypeIdentity,
    index: u16,
}

impl Dependency {
    pub(crate) fn bean(
        qualifier: Option<String>,
        target: BeanTarget,
        declared: TypeIdentity,
        index: u16,
    ) -> Self {
        Self {
            qualifier,
            kind: DependencyKind::Bean { target },
            declared,
            index,
        }
    }

    pub(crate) fn value(binding: ValueBinding, declared: TypeIdentity, index: u16) -> Self {
        Self {
            qualifier: Some(binding.key.clone()),
            kind: DependencyKind::Value { binding },
            declared,
            index,
        }
    }

    /// The qualifier, when the descriptor carries one (value-kind
    /// dependencies carry their property key here)
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Bean or value kind
    pub fn kind(&self) -> &DependencyKind {
        &self.kind
    }

    /// The declared target type
    pub fn declared(&self) -> TypeIdentity {
        self.declared
    }

    /// Positional index within the provider's parameter list
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Whether this dependency is satisfied by another provider
    pub fn is_bean(&self) -> bool {
        matches!(self.kind, DependencyKind::Bean { .. })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dep{{{}:{}}}",
            self.qualifier.as_deref().unwrap_or(""),
            self.declared
        )
    }
}

fn parse_into<T>(key: &str, raw: &str) -> Result<SharedInstance>
where
    T: std::str::FromStr + Send + Sync + 'static,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .map(|parsed| Arc::new(parsed) as SharedInstance)
        .map_err(|e| {
            Error::property_type_mismatch(
                key,
                raw,
                std::any::type_name::<T>(),
                Some(Box::new(e)),
            )
        })
}

/// Parse a raw property string into the declared primitive type.
///
/// Supported targets: bool, the signed and unsigned integer families,
/// f32/f64 and String. Anything else is a [`Error::PropertyTypeMismatch`].
pub(crate) fn parse_property(
    declared: TypeIdentity,
    key: &str,
    raw: &str,
) -> Result<SharedInstance> {
    let id = declared.type_id();
    if id == TypeId::of::<bool>() {
        parse_into::<bool>(key, raw)
    } else if id == TypeId::of::<i8>() {
        parse_into::<i8>(key, raw)
    } else if id == TypeId::of::<i16>() {
        parse_into::<i16>(key, raw)
    } else if id == TypeId::of::<i32>() {
        parse_into::<i32>(key, raw)
    } else if id == TypeId::of::<i64>() {
        parse_into::<i64>(key, raw)
    } else if id == TypeId::of::<isize>() {
        parse_into::<isize>(key, raw)
    } else if id == TypeId::of::<u8>() {
        parse_into::<u8>(key, raw)
    } else if id == TypeId::of::<u16>() {
        parse_into::<u16>(key, raw)
    } else if id == TypeId::of::<u32>() {
        parse_into::<u32>(key, raw)
    } else if id == TypeId::of::<u64>() {
        parse_into::<u64>(key, raw)
    } else if id == TypeId::of::<usize>() {
        parse_into::<usize>(key, raw)
    } else if id == TypeId::of::<f32>() {
        parse_into::<f32>(key, raw)
    } else if id == TypeId::of::<f64>() {
        parse_into::<f64>(key, raw)
    } else if id == TypeId::of::<String>() {
        Ok(Arc::new(raw.to_string()) as SharedInstance)
    } else {
        Err(Error::property_type_mismatch(
            key,
            raw,
            declared.name(),
            None,
        ))
    }
}
