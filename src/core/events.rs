//! Notifications emitted to queue owners.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::util::serde::{IceCandidate, SessionDescription, TaskId};

/// Event emitted by the queue or its default operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A task failed and had no failure handler of its own.
    TaskFailed {
        /// Failed task.
        task_id: TaskId,
        /// Operation name of the failed task.
        operation: String,
        /// Rendered error.
        error: String,
    },
    /// A local description was applied and can be sent to the remote peer.
    LocalDescriptionReady {
        /// The applied description.
        description: SessionDescription,
    },
    /// A remote candidate was applied to the resource.
    CandidateApplied {
        /// The applied candidate.
        candidate: IceCandidate,
    },
    /// A remote candidate could not be built or applied; the task still succeeded.
    CandidateRejected {
        /// Raw payload as received.
        candidate: Value,
        /// Why it was rejected.
        reason: String,
    },
}

/// Destination for [`QueueEvent`]s.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Must not block.
    fn emit(&self, event: QueueEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: QueueEvent) {}
}

/// Bounded in-memory buffer, for tests and dev.
pub struct InMemoryEventSink {
    events: Mutex<VecDeque<QueueEvent>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a buffer that keeps at most `max_events`, dropping the oldest.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events: max_events.max(1),
        }
    }

    /// Snapshot of buffered events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn emit(&self, event: QueueEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Forwards events into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<QueueEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<QueueEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: QueueEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver dropped; discarding event");
        }
    }
}
