//! The managed resource seam and its two operation calling conventions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::core::{QueueError, ResourceSnapshot};
use crate::util::serde::IceCandidate;

/// Boxed future returned by future-style resource operations.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Result delivered to the scheduler when a task body settles.
pub type TaskOutcome = Result<Vec<Value>, QueueError>;

type CallbackFn = Arc<dyn Fn(Vec<Value>, Callbacks) + Send + Sync>;
type FutureFn = Arc<dyn Fn(Vec<Value>) -> BoxFuture<Result<Vec<Value>, String>> + Send + Sync>;

/// Stateful object whose operations the queue serializes.
///
/// Only the task occupying the single-flight slot calls into the resource.
#[async_trait]
pub trait ManagedResource: Send + Sync + 'static {
    /// Current signaling state and description flags.
    fn snapshot(&self) -> ResourceSnapshot;

    /// Look up a named operation. `None` means the resource does not support it.
    fn operation(&self, name: &str) -> Option<ResourceOperation>;

    /// Apply a remote ICE candidate.
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), String>;
}

/// Success/failure handle pair passed to callback-style operations.
///
/// Clones share one settlement: the first `succeed` or `fail` wins and later
/// calls are ignored. Dropping every clone without settling reports an
/// execution error for the operation.
#[derive(Clone)]
pub struct Callbacks {
    operation: Arc<str>,
    slot: Arc<Mutex<Option<oneshot::Sender<TaskOutcome>>>>,
}

impl Callbacks {
    fn new(operation: &str, tx: oneshot::Sender<TaskOutcome>) -> Self {
        Self {
            operation: Arc::from(operation),
            slot: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Report success with result values.
    pub fn succeed(&self, results: Vec<Value>) {
        self.settle(Ok(results));
    }

    /// Report failure with a message from the resource.
    pub fn fail(&self, message: impl Into<String>) {
        self.settle(Err(QueueError::execution(self.operation.as_ref(), message)));
    }

    /// True once either handle has been used.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.lock().is_none()
    }

    fn settle(&self, outcome: TaskOutcome) {
        if let Some(tx) = self.slot.lock().take() {
            let _ = tx.send(outcome);
        }
    }
}

/// A resource operation in one of two calling conventions.
#[derive(Clone)]
pub enum ResourceOperation {
    /// Invoked with arguments plus a [`Callbacks`] pair.
    Callback(CallbackFn),
    /// Invoked with arguments; resolves to results or an error message.
    Future(FutureFn),
}

impl ResourceOperation {
    /// Wrap a callback-style operation.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>, Callbacks) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    /// Wrap a future-style operation.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Value>, String>> + Send + 'static,
    {
        Self::Future(Arc::new(move |args| -> BoxFuture<Result<Vec<Value>, String>> {
            Box::pin(f(args))
        }))
    }

    /// Run the operation and normalize either convention into a [`TaskOutcome`].
    pub async fn invoke(&self, operation: &str, args: Vec<Value>) -> TaskOutcome {
        match self {
            Self::Callback(f) => {
                let (tx, rx) = oneshot::channel();
                f(args, Callbacks::new(operation, tx));
                rx.await.unwrap_or_else(|_| {
                    Err(QueueError::execution(
                        operation,
                        "callbacks dropped without settling",
                    ))
                })
            }
            Self::Future(f) => f(args)
                .await
                .map_err(|message| QueueError::execution(operation, message)),
        }
    }
}
