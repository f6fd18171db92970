//! Task records and the resource state they are scheduled against.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ExecutionStrategy, QueueError, ReadinessCheck, SignalingQueue};
use crate::util::clock::now_ms;
use crate::util::serde::{SignalingState, TaskId};

/// Point-in-time view of the managed resource consulted by readiness checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Current signaling state.
    pub signaling_state: SignalingState,
    /// Whether a local description has been applied.
    pub has_local_description: bool,
    /// Whether a remote description has been applied.
    pub has_remote_description: bool,
}

impl ResourceSnapshot {
    /// Snapshot with the given state and no descriptions.
    #[must_use]
    pub const fn in_state(signaling_state: SignalingState) -> Self {
        Self {
            signaling_state,
            has_local_description: false,
            has_remote_description: false,
        }
    }
}

/// Handler run after a task succeeds. Receives the queue so it can enqueue follow-up work.
pub type SuccessHandler = Arc<dyn Fn(&SignalingQueue, &Task, Vec<Value>) + Send + Sync>;

/// Handler run after a task fails. Replaces the default failure sink for that task.
pub type FailureHandler = Arc<dyn Fn(&SignalingQueue, &Task, &QueueError) + Send + Sync>;

/// One requested operation against the managed resource.
///
/// A task is built once, moved into the queue, promoted into the
/// single-flight slot at most once and dropped after it settles. There are
/// no setters; the builder-style methods consume the task before it is
/// enqueued.
pub struct Task {
    id: TaskId,
    name: String,
    args: Vec<Value>,
    checks: Vec<ReadinessCheck>,
    body: Arc<dyn ExecutionStrategy>,
    on_success: Option<SuccessHandler>,
    on_failure: Option<FailureHandler>,
    created_at_ms: u128,
}

impl Task {
    /// Create a task with no readiness checks and no handlers.
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        args: Vec<Value>,
        body: Arc<dyn ExecutionStrategy>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            args,
            checks: Vec::new(),
            body,
            on_success: None,
            on_failure: None,
            created_at_ms: now_ms(),
        }
    }

    /// Attach readiness checks.
    #[must_use]
    pub fn with_checks(mut self, checks: Vec<ReadinessCheck>) -> Self {
        self.checks = checks;
        self
    }

    /// Attach a success handler.
    #[must_use]
    pub fn with_on_success(mut self, handler: Option<SuccessHandler>) -> Self {
        self.on_success = handler;
        self
    }

    /// Attach a failure handler.
    #[must_use]
    pub fn with_on_failure(mut self, handler: Option<FailureHandler>) -> Self {
        self.on_failure = handler;
        self
    }

    /// Task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments captured at enqueue time.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Readiness checks; empty means always ready.
    #[must_use]
    pub fn checks(&self) -> &[ReadinessCheck] {
        &self.checks
    }

    /// Strategy run when the task is promoted.
    #[must_use]
    pub fn body(&self) -> &Arc<dyn ExecutionStrategy> {
        &self.body
    }

    /// Success handler, if any.
    #[must_use]
    pub const fn on_success(&self) -> Option<&SuccessHandler> {
        self.on_success.as_ref()
    }

    /// Failure handler, if any.
    #[must_use]
    pub const fn on_failure(&self) -> Option<&FailureHandler> {
        self.on_failure.as_ref()
    }

    /// Creation timestamp in milliseconds since epoch.
    #[must_use]
    pub const fn created_at_ms(&self) -> u128 {
        self.created_at_ms
    }

    /// True iff every check passes against `snapshot`.
    #[must_use]
    pub fn is_ready(&self, snapshot: &ResourceSnapshot) -> bool {
        crate::core::checks::all_ready(&self.checks, snapshot)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("args", &self.args)
            .field("checks", &self.checks)
            .field("has_on_success", &self.on_success.is_some())
            .field("has_on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}
