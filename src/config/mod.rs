//! Configuration models for the queue.

pub mod queue;

pub use queue::QueueConfig;
