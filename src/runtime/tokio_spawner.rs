//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::QueueError;

/// Tokio-based spawner that runs queue timers and task bodies on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioSpawner {
    /// Create a new `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Spawner for the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Config`] when called outside a tokio runtime.
    pub fn current() -> Result<Self, QueueError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| QueueError::Config(format!("no tokio runtime: {e}")))
    }

    /// Spawn a future, returning its join handle.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut)
    }
}
