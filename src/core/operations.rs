//! Named operations: the enqueue façade and the default signaling wiring.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::core::{
    ApplyCandidate, DescriptionFactory, ExecutionStrategy, FailureHandler, InvokeOperation,
    QueueError, QueueEvent, ReadinessCheck, SignalingQueue, SuccessHandler, Task,
};
use crate::util::serde::{SessionDescription, SignalingState, TaskId};

/// Apply a remote ICE candidate.
pub const APPLY_CANDIDATE: &str = "apply-candidate";
/// Apply a local session description.
pub const SET_LOCAL_DESCRIPTION: &str = "set-local-description";
/// Apply a remote session description.
pub const SET_REMOTE_DESCRIPTION: &str = "set-remote-description";
/// Create an offer.
pub const CREATE_OFFER: &str = "create-offer";
/// Create an answer.
pub const CREATE_ANSWER: &str = "create-answer";

/// Maps call arguments before the task is built.
pub type ArgTransform = Arc<dyn Fn(Vec<Value>) -> Result<Vec<Value>, QueueError> + Send + Sync>;

/// Everything fixed about an operation; each call adds only its arguments.
#[derive(Clone)]
pub struct OperationSpec {
    name: String,
    checks: Vec<ReadinessCheck>,
    body: Arc<dyn ExecutionStrategy>,
    transform: Option<ArgTransform>,
    on_success: Option<SuccessHandler>,
    on_failure: Option<FailureHandler>,
}

impl OperationSpec {
    /// Operation run by `body`, with no checks or handlers.
    pub fn new(name: impl Into<String>, body: Arc<dyn ExecutionStrategy>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
            body,
            transform: None,
            on_success: None,
            on_failure: None,
        }
    }

    /// Operation that invokes the resource method of the same name.
    pub fn invoke(name: impl Into<String>) -> Self {
        Self::new(name, Arc::new(InvokeOperation))
    }

    /// Add a readiness check.
    #[must_use]
    pub fn check(mut self, check: ReadinessCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Set the argument transform.
    #[must_use]
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Vec<Value>, QueueError> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Set the success handler.
    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&SignalingQueue, &Task, Vec<Value>) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Set the failure handler, replacing the default failure event.
    #[must_use]
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&SignalingQueue, &Task, &QueueError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(f));
        self
    }

    /// Operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Readiness checks attached to every task of this operation.
    #[must_use]
    pub fn checks(&self) -> &[ReadinessCheck] {
        &self.checks
    }

    pub(crate) fn prepare_args(&self, args: Vec<Value>) -> Result<Vec<Value>, QueueError> {
        match &self.transform {
            Some(transform) => transform(args),
            None => Ok(args),
        }
    }

    pub(crate) fn build_task(&self, id: TaskId, args: Vec<Value>) -> Task {
        Task::new(id, self.name.clone(), args, Arc::clone(&self.body))
            .with_checks(self.checks.clone())
            .with_on_success(self.on_success.clone())
            .with_on_failure(self.on_failure.clone())
    }
}

/// The five signaling operations with their checks, transforms and chaining.
#[must_use]
pub fn default_operations(descriptions: DescriptionFactory) -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(APPLY_CANDIDATE, Arc::new(ApplyCandidate))
            .check(ReadinessCheck::has_local_or_remote_description()),
        OperationSpec::invoke(SET_LOCAL_DESCRIPTION).on_success(announce_local_description),
        OperationSpec::invoke(SET_REMOTE_DESCRIPTION)
            .check(ReadinessCheck::not_closed())
            .transform(move |args| build_description(&descriptions, args))
            .on_success(answer_remote_offer),
        OperationSpec::invoke(CREATE_OFFER)
            .check(ReadinessCheck::not_closed())
            .check(ReadinessCheck::not_negotiating())
            .on_success(apply_created_description),
        OperationSpec::invoke(CREATE_ANSWER)
            .check(ReadinessCheck::not_closed())
            .on_success(apply_created_description),
    ]
}

fn build_description(
    factory: &DescriptionFactory,
    mut args: Vec<Value>,
) -> Result<Vec<Value>, QueueError> {
    let raw = args
        .first()
        .ok_or_else(|| QueueError::MalformedPayload("missing session description".into()))?;
    let description = factory(raw)?;
    args[0] = serde_json::to_value(description)
        .map_err(|e| QueueError::MalformedPayload(e.to_string()))?;
    Ok(args)
}

fn announce_local_description(queue: &SignalingQueue, task: &Task, _results: Vec<Value>) {
    let decoded = task
        .args()
        .first()
        .map(|raw| serde_json::from_value::<SessionDescription>(raw.clone()));
    match decoded {
        Some(Ok(description)) => queue.emit(QueueEvent::LocalDescriptionReady { description }),
        Some(Err(e)) => warn!(
            task_id = task.id(),
            error = %e,
            "applied local description is not decodable"
        ),
        None => warn!(task_id = task.id(), "set-local-description ran without a description"),
    }
}

fn answer_remote_offer(queue: &SignalingQueue, task: &Task, _results: Vec<Value>) {
    if queue.resource_snapshot().signaling_state != SignalingState::HaveRemoteOffer {
        return;
    }
    if let Err(e) = queue.create_answer(None) {
        warn!(task_id = task.id(), error = %e, "could not queue answer for remote offer");
    }
}

fn apply_created_description(queue: &SignalingQueue, task: &Task, results: Vec<Value>) {
    let Some(description) = results.into_iter().next() else {
        queue.emit(QueueEvent::TaskFailed {
            task_id: task.id(),
            operation: task.name().to_string(),
            error: "resource produced no description".into(),
        });
        return;
    };
    if let Err(e) = queue.call(SET_LOCAL_DESCRIPTION, vec![description]) {
        warn!(task_id = task.id(), error = %e, "could not queue local description");
    }
}

impl SignalingQueue {
    /// Queue a remote candidate, an event wrapping one, or the end-of-candidates marker.
    ///
    /// # Errors
    ///
    /// [`QueueError::UnknownOperation`] if the default operations were not registered.
    pub fn apply_candidate(&self, candidate: Value) -> Result<TaskId, QueueError> {
        self.call(APPLY_CANDIDATE, vec![candidate])
    }

    /// Queue applying a local description.
    ///
    /// # Errors
    ///
    /// Serialization failure or an unregistered operation.
    pub fn set_local_description(
        &self,
        description: &SessionDescription,
    ) -> Result<TaskId, QueueError> {
        let value = serde_json::to_value(description)
            .map_err(|e| QueueError::MalformedPayload(e.to_string()))?;
        self.call(SET_LOCAL_DESCRIPTION, vec![value])
    }

    /// Queue applying a raw remote description.
    ///
    /// # Errors
    ///
    /// [`QueueError::MalformedPayload`] if the description factory rejects it.
    pub fn set_remote_description(&self, description: Value) -> Result<TaskId, QueueError> {
        self.call(SET_REMOTE_DESCRIPTION, vec![description])
    }

    /// Queue creating an offer; its result is applied as the local description.
    ///
    /// # Errors
    ///
    /// [`QueueError::UnknownOperation`] if the default operations were not registered.
    pub fn create_offer(&self, options: Option<Value>) -> Result<TaskId, QueueError> {
        self.call(CREATE_OFFER, options.into_iter().collect())
    }

    /// Queue creating an answer; its result is applied as the local description.
    ///
    /// # Errors
    ///
    /// [`QueueError::UnknownOperation`] if the default operations were not registered.
    pub fn create_answer(&self, options: Option<Value>) -> Result<TaskId, QueueError> {
        self.call(CREATE_ANSWER, options.into_iter().collect())
    }
}
