//! Task bodies: how a promoted task talks to the managed resource.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{
    CandidateFactory, EventSink, ManagedResource, QueueError, QueueEvent, Task, TaskOutcome,
};

/// Everything a strategy may touch while it runs.
#[derive(Clone)]
pub struct ExecutionContext {
    resource: Arc<dyn ManagedResource>,
    candidates: CandidateFactory,
    events: Arc<dyn EventSink>,
}

impl ExecutionContext {
    /// Bundle the resource with the candidate factory and event sink.
    pub fn new(
        resource: Arc<dyn ManagedResource>,
        candidates: CandidateFactory,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            resource,
            candidates,
            events,
        }
    }

    /// The managed resource.
    #[must_use]
    pub fn resource(&self) -> &Arc<dyn ManagedResource> {
        &self.resource
    }

    /// Emit a notification.
    pub fn emit(&self, event: QueueEvent) {
        self.events.emit(event);
    }
}

/// Body of a task, run once when the task is promoted.
///
/// The returned [`TaskOutcome`] is the task's continuation: the scheduler
/// frees the single-flight slot, then runs the task's success or failure
/// handling.
///
/// ```rust,ignore
/// struct Noop;
///
/// #[async_trait]
/// impl ExecutionStrategy for Noop {
///     async fn execute(&self, _ctx: &ExecutionContext, _task: &Task) -> TaskOutcome {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait ExecutionStrategy: Send + Sync + 'static {
    /// Run the task against the resource.
    async fn execute(&self, ctx: &ExecutionContext, task: &Task) -> TaskOutcome;
}

/// Calls the resource operation named after the task with the task's arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeOperation;

#[async_trait]
impl ExecutionStrategy for InvokeOperation {
    async fn execute(&self, ctx: &ExecutionContext, task: &Task) -> TaskOutcome {
        let Some(operation) = ctx.resource.operation(task.name()) else {
            return Err(QueueError::UnsupportedOperation(task.name().to_string()));
        };
        operation.invoke(task.name(), task.args().to_vec()).await
    }
}

/// Applies a remote ICE candidate. Never reports failure.
///
/// The first argument is either a candidate (`{"candidate": "candidate:..."}`)
/// or an event wrapping one (`{"candidate": {"candidate": "candidate:..."}}`).
/// A null, missing or empty candidate marks the end of candidates and
/// succeeds without touching the resource. Any other candidate value goes
/// through the candidate factory, which logs and discards it if malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyCandidate;

#[async_trait]
impl ExecutionStrategy for ApplyCandidate {
    async fn execute(&self, ctx: &ExecutionContext, task: &Task) -> TaskOutcome {
        let Some(raw) = candidate_payload(task.args().first()).cloned() else {
            debug!(task_id = task.id(), "end of candidates");
            return Ok(Vec::new());
        };

        let candidate = match (ctx.candidates)(&raw) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(task_id = task.id(), error = %e, "discarding malformed candidate");
                ctx.emit(QueueEvent::CandidateRejected {
                    candidate: raw,
                    reason: e.to_string(),
                });
                return Ok(Vec::new());
            }
        };

        match ctx.resource.add_ice_candidate(candidate.clone()).await {
            Ok(()) => ctx.emit(QueueEvent::CandidateApplied { candidate }),
            Err(reason) => {
                warn!(task_id = task.id(), %reason, "resource rejected candidate");
                ctx.emit(QueueEvent::CandidateRejected {
                    candidate: raw,
                    reason,
                });
            }
        }
        Ok(Vec::new())
    }
}

/// Unwrap the candidate payload, or `None` for the end-of-candidates marker.
///
/// Only a null, missing or empty candidate ends candidates. Any other shape
/// is returned as is and left for the candidate factory to reject.
#[must_use]
pub fn candidate_payload(arg: Option<&Value>) -> Option<&Value> {
    let value = arg?;
    match value.get("candidate")? {
        inner @ Value::Object(_) => candidate_payload(Some(inner)),
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        _ => Some(value),
    }
}
