//! Single-flight scheduler over one managed resource.
//!
//! All scheduler-owned state (pending set, executing slot) sits behind one
//! `parking_lot::Mutex` that is only held for short, non-reentrant critical
//! sections. Strategies, handlers and event sinks always run with the lock
//! released, so a handler may freely enqueue more work.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::QueueConfig;
use crate::core::{
    build_audit_event, AuditAction, AuditSink, ExecutionContext, ManagedResource,
    OperationSpec, PriorityComparator, PriorityTable, QueueError, QueueEvent, ResourceSnapshot,
    Task, TaskOutcome,
};
use crate::infra::queue::PendingQueue;
use crate::runtime::{PollTrigger, TokioSpawner};
use crate::util::clock::now_ms;
use crate::util::serde::TaskId;

/// Counters and occupancy at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Tasks pushed into the queue.
    pub enqueued: u64,
    /// Poll evaluations run.
    pub polls: u64,
    /// Tasks promoted into the executing slot.
    pub started: u64,
    /// Tasks settled successfully.
    pub completed: u64,
    /// Tasks settled with an error.
    pub failed: u64,
    /// Tasks currently pending.
    pub pending: usize,
    /// Whether the executing slot is occupied.
    pub executing: bool,
}

#[derive(Debug, Default)]
struct QueueCounters {
    enqueued: AtomicU64,
    polls: AtomicU64,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

#[derive(Default)]
struct SchedulerState {
    pending: PendingQueue,
    executing: Option<Arc<Task>>,
    // true while a settled task's handler runs; polls must not promote then
    settling: bool,
}

impl SchedulerState {
    fn busy(&self) -> bool {
        self.executing.is_some() || self.settling
    }
}

/// Clears `settling` when the handler returns or unwinds.
struct SettleGuard<'a> {
    state: &'a Mutex<SchedulerState>,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().settling = false;
    }
}

/// Everything the builder resolves before a queue can exist.
pub(crate) struct QueueParts {
    pub config: QueueConfig,
    pub context: ExecutionContext,
    pub audit: Option<Arc<dyn AuditSink>>,
    pub spawner: TokioSpawner,
}

struct Inner {
    config: QueueConfig,
    comparator: PriorityComparator,
    context: ExecutionContext,
    audit: Option<Arc<dyn AuditSink>>,
    state: Mutex<SchedulerState>,
    operations: RwLock<HashMap<String, Arc<OperationSpec>>>,
    trigger: PollTrigger,
    spawner: TokioSpawner,
    counters: QueueCounters,
    next_id: AtomicU64,
}

/// Serializes operations against one managed resource.
///
/// Cloning is cheap and every clone drives the same queue. Build one with
/// [`crate::builders::QueueBuilder`] or [`SignalingQueue::new`].
#[derive(Clone)]
pub struct SignalingQueue {
    inner: Arc<Inner>,
}

impl SignalingQueue {
    /// Queue over `resource` with default configuration and operations.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Config`] outside a tokio runtime.
    pub fn new(resource: Arc<dyn ManagedResource>) -> Result<Self, QueueError> {
        crate::builders::QueueBuilder::new(resource).build()
    }

    pub(crate) fn from_parts(parts: QueueParts) -> Self {
        let comparator =
            PriorityComparator::new(PriorityTable::new(parts.config.priorities.clone()));
        Self {
            inner: Arc::new(Inner {
                comparator,
                trigger: PollTrigger::new(parts.spawner.clone()),
                config: parts.config,
                context: parts.context,
                audit: parts.audit,
                state: Mutex::new(SchedulerState::default()),
                operations: RwLock::new(HashMap::new()),
                spawner: parts.spawner,
                counters: QueueCounters::default(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Register (or replace) a named operation.
    pub fn register(&self, op: OperationSpec) {
        let name = op.name().to_string();
        debug!(operation = %name, "operation registered");
        self.inner.operations.write().insert(name, Arc::new(op));
    }

    /// Registered operation names, sorted.
    #[must_use]
    pub fn operation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.operations.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Enqueue a call to a registered operation.
    ///
    /// Arguments are captured as given and passed through the operation's
    /// transform, if any, before the task is built.
    ///
    /// # Errors
    ///
    /// [`QueueError::UnknownOperation`] for an unregistered name, or the
    /// transform's error. In both cases nothing is enqueued.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<TaskId, QueueError> {
        let op = self
            .inner
            .operations
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| QueueError::UnknownOperation(name.to_string()))?;
        let args = op.prepare_args(args)?;
        let task = op.build_task(self.next_task_id(), args);
        Ok(self.push(task))
    }

    /// Push a prebuilt task and schedule a poll.
    pub fn push(&self, task: Task) -> TaskId {
        let id = task.id();
        self.record_audit(&task, AuditAction::Enqueue, None);
        debug!(task_id = id, operation = task.name(), "task enqueued");
        self.inner.state.lock().pending.push(task);
        self.inner.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        self.schedule_poll(self.inner.config.settle_delay());
        id
    }

    /// Allocate the next task identifier.
    #[must_use]
    pub fn next_task_id(&self) -> TaskId {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Schedule a poll, e.g. to resume after a task failure.
    pub fn trigger(&self) {
        self.schedule_poll(self.inner.config.settle_delay());
    }

    /// Evaluate the head of the queue once.
    ///
    /// Promotes the best-ranked task if it is ready and nothing is executing
    /// or settling. Otherwise re-arms the retry timer while tasks remain and
    /// the resource is not closed.
    pub fn poll(&self) {
        let inner = &self.inner;
        inner.counters.polls.fetch_add(1, Ordering::Relaxed);
        let snapshot = inner.context.resource().snapshot();

        let (promoted, pending) = {
            let mut state = inner.state.lock();
            let promoted = if state.busy() {
                None
            } else {
                let best = state.pending.peek_best(&inner.comparator, &snapshot);
                match best {
                    Some((index, rank)) if rank.is_ready() => {
                        state.pending.take(index).map(Arc::new)
                    }
                    _ => None,
                }
            };
            if let Some(task) = &promoted {
                state.executing = Some(Arc::clone(task));
            }
            (promoted, state.pending.len())
        };

        if let Some(task) = promoted {
            self.start(task);
            return;
        }

        if pending == 0 {
            return;
        }
        if snapshot.signaling_state.is_closed() {
            debug!(pending, "resource closed; retry polling stopped");
            return;
        }
        debug!(
            pending,
            retry_ms = inner.config.retry_delay_ms,
            "head of queue not runnable; retrying"
        );
        self.schedule_poll(inner.config.retry_delay());
    }

    fn start(&self, task: Arc<Task>) {
        self.inner.counters.started.fetch_add(1, Ordering::Relaxed);
        self.record_audit(&task, AuditAction::Start, None);
        info!(
            task_id = task.id(),
            operation = task.name(),
            waited_ms = now_ms().saturating_sub(task.created_at_ms()),
            "task started"
        );

        let queue = self.clone();
        let ctx = self.inner.context.clone();
        self.inner.spawner.spawn(async move {
            let outcome = task.body().execute(&ctx, &task).await;
            queue.settle(task, outcome);
        });
    }

    fn settle(&self, task: Arc<Task>, outcome: TaskOutcome) {
        // Vacate the slot before any handler runs so handlers may enqueue, but
        // stay busy until the handler returns: its follow-up work must compete
        // in the next poll.
        {
            let mut state = self.inner.state.lock();
            debug_assert!(state
                .executing
                .as_ref()
                .is_some_and(|running| running.id() == task.id()));
            state.executing = None;
            state.settling = true;
        }
        let guard = SettleGuard {
            state: &self.inner.state,
        };

        match outcome {
            Ok(results) => {
                self.inner.counters.completed.fetch_add(1, Ordering::Relaxed);
                self.record_audit(&task, AuditAction::Complete, None);
                info!(task_id = task.id(), operation = task.name(), "task completed");
                if let Some(handler) = task.on_success() {
                    handler(self, &task, results);
                }
                drop(guard);
                self.schedule_poll(self.inner.config.settle_delay());
            }
            Err(error) => {
                self.inner.counters.failed.fetch_add(1, Ordering::Relaxed);
                self.record_audit(&task, AuditAction::Fail, Some(error.to_string()));
                warn!(task_id = task.id(), operation = task.name(), %error, "task failed");
                match task.on_failure() {
                    Some(handler) => handler(self, &task, &error),
                    None => self.emit(QueueEvent::TaskFailed {
                        task_id: task.id(),
                        operation: task.name().to_string(),
                        error: error.to_string(),
                    }),
                }
                // Polling is not re-armed after a failure. The next enqueue or
                // an explicit trigger() resumes the queue.
            }
        }
    }

    fn schedule_poll(&self, delay: Duration) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.trigger.arm(delay, move || {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.poll();
            }
        });
    }

    fn record_audit(&self, task: &Task, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = &self.inner.audit {
            sink.record(build_audit_event(task.id(), task.name(), action, detail));
        }
    }

    /// Emit a notification through the queue's event sink.
    pub fn emit(&self, event: QueueEvent) {
        self.inner.context.emit(event);
    }

    /// The managed resource.
    #[must_use]
    pub fn resource(&self) -> &Arc<dyn ManagedResource> {
        self.inner.context.resource()
    }

    /// Current resource snapshot.
    #[must_use]
    pub fn resource_snapshot(&self) -> ResourceSnapshot {
        self.resource().snapshot()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Identifiers and names of pending tasks, in enqueue order.
    #[must_use]
    pub fn pending_tasks(&self) -> Vec<(TaskId, String)> {
        self.inner.state.lock().pending.summary()
    }

    /// Whether a task occupies the executing slot.
    #[must_use]
    pub fn is_executing(&self) -> bool {
        self.inner.state.lock().executing.is_some()
    }

    /// Identifier and name of the executing task.
    #[must_use]
    pub fn executing(&self) -> Option<(TaskId, String)> {
        self.inner
            .state
            .lock()
            .executing
            .as_ref()
            .map(|t| (t.id(), t.name().to_string()))
    }

    /// Whether a poll is scheduled.
    #[must_use]
    pub fn poll_scheduled(&self) -> bool {
        self.inner.trigger.is_armed()
    }

    /// Snapshot of counters and occupancy.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let (pending, executing) = {
            let state = self.inner.state.lock();
            (state.pending.len(), state.executing.is_some())
        };
        let c = &self.inner.counters;
        QueueStats {
            enqueued: c.enqueued.load(Ordering::Relaxed),
            polls: c.polls.load(Ordering::Relaxed),
            started: c.started.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            pending,
            executing,
        }
    }
}
