//! Provider factories and capability declarations
//!
//! A [`Provider`] wraps the caller-supplied construction function: exactly
//! one primary output (`T`) with the `Result` standing in for the optional
//! trailing error output. Arguments arrive pre-resolved, in declaration
//! order, through [`ProviderArgs`].
//!
//! A [`Capability`] is the registration-time declaration that a produced
//! value implements a trait: it pairs the trait-object identity with a
//! cast from the erased instance to `Arc<dyn Trait>`. This replaces any
//! runtime introspection of the produced value.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::key::{CapabilityId, TypeIdentity};

/// An erased produced object, shared between the container and dependents
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Positional arguments handed to a provider factory.
///
/// One entry per declared dependency, in declaration order. The factory
/// must consume every argument exactly once; anything else is an
/// [`Error::InvalidProviderShape`].
pub struct ProviderArgs {
    values: Vec<SharedInstance>,
    cursor: usize,
}

impl ProviderArgs {
    pub(crate) fn new(values: Vec<SharedInstance>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Take the next argument as a shared `Arc<T>`
    pub fn take<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let position = self.cursor;
        let value = self.values.get(position).cloned().ok_or_else(|| {
            Error::invalid_provider_shape(format!(
                "factory requested argument {position} but only {} were resolved",
                self.values.len()
            ))
        })?;
        self.cursor += 1;
        value.downcast::<T>().map_err(|_| {
            Error::invalid_provider_shape(format!(
                "argument {position} is not of type {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Take the next argument by value (clones out of the shared instance);
    /// the usual way to consume resolved configuration values
    pub fn take_value<T: Clone + Send + Sync + 'static>(&mut self) -> Result<T> {
        self.take::<T>().map(|shared| (*shared).clone())
    }

    /// Number of arguments not yet consumed
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

type FactoryFn = Arc<dyn Fn(&mut ProviderArgs) -> Result<SharedInstance> + Send + Sync>;

/// A validated construction function plus the identity of what it produces
#[derive(Clone)]
pub struct Provider {
    produced: TypeIdentity,
    factory: FactoryFn,
}

impl Provider {
    /// Wrap a factory producing a `T` by value
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ProviderArgs) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            produced: TypeIdentity::of::<T>(),
            factory: Arc::new(move |args| {
                factory(args).map(|value| Arc::new(value) as SharedInstance)
            }),
        }
    }

    /// Wrap a factory producing an already-shared `Arc<T>`; the container
    /// stores the same allocation instead of re-wrapping it
    pub fn from_shared<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ProviderArgs) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            produced: TypeIdentity::of::<T>(),
            factory: Arc::new(move |args| factory(args).map(|value| value as SharedInstance)),
        }
    }

    /// Identity of the produced type
    pub fn produced(&self) -> TypeIdentity {
        self.produced
    }

    pub(crate) fn call(&self, mut args: ProviderArgs) -> Result<SharedInstance> {
        let instance = (self.factory)(&mut args)?;
        if args.remaining() > 0 {
            return Err(Error::invalid_provider_shape(format!(
                "factory for {} left {} argument(s) unconsumed",
                self.produced,
                args.remaining()
            )));
        }
        Ok(instance)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("produced", &self.produced.name())
            .finish_non_exhaustive()
    }
}

type CapabilityCast = Arc<dyn Fn(&SharedInstance) -> Option<Box<dyn Any>> + Send + Sync>;
type CapabilityShare = Arc<dyn Fn(&SharedInstance) -> Option<SharedInstance> + Send + Sync>;

/// Declaration that a produced type implements a capability.
///
/// ```
/// use std::sync::Arc;
/// use wirebox::Capability;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let capability = Capability::of::<English, dyn Greeter>(|g| g);
/// ```
#[derive(Clone)]
pub struct Capability {
    id: CapabilityId,
    cast: CapabilityCast,
    share: CapabilityShare,
}

impl Capability {
    /// Declare that produced type `T` implements capability `C`.
    ///
    /// The cast is an unsizing coercion in practice (`|arc| arc`); it is
    /// taken as a function so the engine never needs to introspect `T`.
    pub fn of<T, C>(cast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        T: Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            id: CapabilityId::of::<C>(),
            cast: Arc::new(move |instance: &SharedInstance| {
                instance
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|concrete| Box::new(cast(concrete)) as Box<dyn Any>)
            }),
            share: Arc::new(move |instance: &SharedInstance| {
                instance
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|concrete| Arc::new(cast(concrete)) as SharedInstance)
            }),
        }
    }

    /// The declared capability identity
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// Cast an erased instance to the capability object, re-erased for the
    /// container so a dependent factory can take it as `Arc<C>`
    pub(crate) fn shared(&self, instance: &SharedInstance) -> Option<SharedInstance> {
        (self.share)(instance)
    }

    /// Cast an erased instance to the capability object; `None` when the
    /// instance is not of the declaring type or `C` is a different
    /// capability than declared
    pub fn extract<C: ?Sized + 'static>(&self, instance: &SharedInstance) -> Option<Arc<C>> {
        if self.id != CapabilityId::of::<C>() {
            return None;
        }
        (self.cast)(instance)
            .and_then(|boxed| boxed.downcast::<Arc<C>>().ok())
            .map(|boxed| *boxed)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("id", &self.id.name())
            .finish_non_exhaustive()
    }
}
