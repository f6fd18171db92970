//! # Signaling Queue
//!
//! A single-flight task queue that serializes mutating operations against one
//! stateful resource, typically a peer connection going through offer/answer
//! negotiation.
//!
//! Operations are enqueued as tasks. Each task carries readiness checks that
//! are evaluated against the resource's *current* state, and the queue always
//! promotes the best-ranked ready task. Rank is recomputed at every poll, so
//! a candidate that could not be applied a moment ago jumps ahead as soon as
//! a description lands.
//!
//! ## Key Features
//!
//! - **Dynamic priority**: static operation ordering, demoted to "wait" while
//!   a task's checks fail
//! - **Single flight**: at most one task touches the resource at a time
//! - **Debounced polling**: bursts of enqueues coalesce into one poll; the
//!   queue retries on a timer while the head is not runnable
//! - **Two calling conventions**: callback-style and future-style resource
//!   operations settle the same continuation
//! - **Chained signaling**: offers and answers are applied as the local
//!   description, remote offers are answered automatically
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use signaling_queue::builders::QueueBuilder;
//! use signaling_queue::core::{InMemoryEventSink, ManagedResource};
//! use signaling_queue::infra::LoopbackPeer;
//!
//! let peer = Arc::new(LoopbackPeer::new());
//! let events = Arc::new(InMemoryEventSink::new(64));
//! let queue = QueueBuilder::new(peer.clone() as Arc<dyn ManagedResource>)
//!     .event_sink(events.clone())
//!     .build()?;
//!
//! queue.apply_candidate(remote_candidate)?; // waits for a description
//! queue.create_offer(None)?;                // runs, then applies the offer locally
//! ```
//!
//! For complete flows, see `tests/scheduler_scenarios_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core queue abstractions: tasks, readiness, ranking and the scheduler.
pub mod core;
/// Configuration models for the queue.
pub mod config;
/// Builders to assemble a queue from configuration and collaborators.
pub mod builders;
/// Infrastructure adapters for pending-task storage and managed resources.
pub mod infra;
/// Runtime adapters: tokio spawning and the poll timer.
pub mod runtime;
/// Shared utilities.
pub mod util;
