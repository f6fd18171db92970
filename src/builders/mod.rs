//! Builders to assemble a queue from configuration and collaborators.

pub mod queue_builder;

pub use queue_builder::{PlatformDetector, QueueBuilder, StandardPlatform};
