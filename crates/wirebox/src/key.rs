//! Bind key and type identity value types
//!
//! Runtime reflection is replaced by explicit identities: a
//! [`TypeIdentity`] names a concrete produced type, a [`CapabilityId`]
//! names a trait-object type a provider declares it implements. Both are
//! `TypeId`-backed, so equality is exact and cheap; the captured type name
//! is display material only.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a Rust type: its `TypeId` plus a human-readable name.
///
/// Equality and hashing consider only the `TypeId`; two identities with
/// different display names but the same `TypeId` are the same type.
#[derive(Clone, Copy, Debug)]
pub struct TypeIdentity {
    id: TypeId,
    name: &'static str,
}

impl TypeIdentity {
    /// Identity of the type `T` (unsized types such as `dyn Trait` allowed)
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The display name captured at construction
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdentity {}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a capability (a trait-object type a provider implements)
///
/// Providers declare the capabilities they satisfy at registration time via
/// [`Capability`](crate::provider::Capability); dependency matching and
/// capability lookups compare these identities instead of introspecting
/// opaque values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CapabilityId(TypeIdentity);

impl CapabilityId {
    /// Identity of the capability type `C`, typically `dyn Trait`
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self(TypeIdentity::of::<C>())
    }

    /// The display name of the capability type
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

/// Identity of a provided value: the produced type plus an ordered set of
/// qualifier labels.
///
/// Two keys are equal iff their produced types are equal and their
/// qualifier sets are equal. Qualifier comparison is order-independent;
/// display preserves declaration order.
#[derive(Clone, Debug)]
pub struct BindKey {
    qualifiers: Vec<String>,
    produced: TypeIdentity,
}

impl BindKey {
    pub(crate) fn new(qualifiers: Vec<String>, produced: TypeIdentity) -> Self {
        Self {
            qualifiers,
            produced,
        }
    }

    /// The qualifier labels in declaration order
    pub fn qualifiers(&self) -> &[String] {
        &self.qualifiers
    }

    /// The produced type identity
    pub fn produced(&self) -> TypeIdentity {
        self.produced
    }

    /// Whether the qualifier set contains the given label
    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers.iter().any(|q| q == qualifier)
    }
}

impl PartialEq for BindKey {
    fn eq(&self, other: &Self) -> bool {
        if self.produced != other.produced || self.qualifiers.len() != other.qualifiers.len() {
            return false;
        }
        self.qualifiers.iter().all(|q| other.has_qualifier(q))
    }
}

impl Eq for BindKey {}

impl fmt::Display for BindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key{{[{}]:{}}}", self.qualifiers.join(","), self.produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    struct Beta;

    #[test]
    fn type_identity_equality_ignores_name() {
        assert_eq!(TypeIdentity::of::<Alpha>(), TypeIdentity::of::<Alpha>());
        assert_ne!(TypeIdentity::of::<Alpha>(), TypeIdentity::of::<Beta>());
    }

    #[test]
    fn bind_key_equality_is_order_independent() {
        let a = BindKey::new(
            vec!["x".into(), "y".into()],
            TypeIdentity::of::<Alpha>(),
        );
        let b = BindKey::new(
            vec!["y".into(), "x".into()],
            TypeIdentity::of::<Alpha>(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn bind_key_inequality_on_type_or_qualifiers() {
        let a = BindKey::new(vec!["x".into()], TypeIdentity::of::<Alpha>());
        let b = BindKey::new(vec!["x".into()], TypeIdentity::of::<Beta>());
        let c = BindKey::new(vec!["x".into(), "y".into()], TypeIdentity::of::<Alpha>());
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn bind_key_display_preserves_declaration_order() {
        let key = BindKey::new(
            vec!["first".into(), "second".into()],
            TypeIdentity::of::<Alpha>(),
        );
        let rendered = key.to_string();
        assert!(rendered.contains("first,second"));
    }
}
