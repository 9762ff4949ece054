//! @ai:module:intent Ordered fail-fast stage pipeline over a shared analysis context
//! @ai:module:layer application
//! @ai:module:public_api Stage, Data, Pipeline, CancelToken
//! @ai:module:depends_on model, error
//! @ai:module:thread_safe true

pub mod extract;
pub mod filter;
pub mod module;
pub mod serialize;
pub mod types;
pub mod validate;

use crate::error::{Error, Result};
use crate::model::{Interface, Package, TypeInfo};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// @ai:intent Mutable analysis context threaded through the pipeline
#[derive(Debug, Clone, Default)]
pub struct Data {
    pub package: Package,
    /// Absolute package directory; `package.package_path` becomes relative
    /// to the module root once module resolution succeeds.
    pub absolute_path: PathBuf,
    pub interfaces: Vec<Interface>,
    pub types: BTreeMap<String, TypeInfo>,
}

/// @ai:intent One pipeline phase transforming the analysis context
pub trait Stage: Send + Sync {
    fn process(&self, cancel: &CancelToken, data: Data) -> Result<Data>;
}

/// @ai:intent Cooperative cancellation signal, polled per file or per resolved type
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// @ai:intent Fixed ordered composition of stages, short-circuiting on first error
///
/// Holds no cross-invocation mutable state, so one instance may serve
/// concurrent executions with separate contexts.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// @ai:intent Run every stage in order; the first error aborts
    /// @ai:post no rollback, no retries; retry policy is the caller's
    pub fn execute(&self, cancel: &CancelToken, initial: Data) -> Result<Data> {
        let mut data = initial;
        for stage in &self.stages {
            data = stage.process(cancel, data)?;
        }
        Ok(data)
    }
}
