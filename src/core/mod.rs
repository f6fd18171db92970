//! Core queue abstractions: tasks, readiness, ranking and the scheduler.

pub mod audit;
pub mod checks;
pub mod error;
pub mod events;
pub mod factory;
pub mod model;
pub mod operations;
pub mod priority;
pub mod resource;
pub mod scheduler;
pub mod strategy;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use checks::{all_ready, ReadinessCheck};
pub use error::{AppResult, QueueError};
pub use events::{ChannelEventSink, EventSink, InMemoryEventSink, NullEventSink, QueueEvent};
pub use factory::{
    standard_candidate_factory, standard_description_factory, CandidateFactory,
    DescriptionFactory,
};
pub use model::{FailureHandler, ResourceSnapshot, SuccessHandler, Task};
pub use operations::{default_operations, ArgTransform, OperationSpec};
pub use priority::{PriorityComparator, PriorityTable, Rank, DEFAULT_PRIORITIES};
pub use resource::{BoxFuture, Callbacks, ManagedResource, ResourceOperation, TaskOutcome};
pub use scheduler::{QueueStats, SignalingQueue};
pub(crate) use scheduler::QueueParts;
pub use strategy::{
    candidate_payload, ApplyCandidate, ExecutionContext, ExecutionStrategy, InvokeOperation,
};
