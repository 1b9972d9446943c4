//! Post-processor capability and container
//!
//! Post-processors run once after every instance exists, in
//! container-registration order, for cross-cutting setup. They are
//! discovered as a side effect of instantiation: any singleton declaring
//! the `dyn PostProcessor` capability is collected here.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::context::ContextHandle;
use crate::error::Result;

/// Hook invoked once per matching instance after the build walk
pub trait PostProcessor: Send + Sync {
    /// Runs after all instances exist; an error aborts the build
    fn post_process(&self, ctx: &ContextHandle) -> Result<()>;
}

pub(crate) struct PostProcessorContainer {
    ls: RwLock<Vec<Arc<dyn PostProcessor>>>,
}

impl PostProcessorContainer {
    pub(crate) fn new() -> Self {
        Self {
            ls: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, processor: Arc<dyn PostProcessor>, definition: &str) {
        self.ls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(processor);
        info!(definition, "post processor added");
    }

    /// Snapshot in registration order
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn PostProcessor>> {
        self.ls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
