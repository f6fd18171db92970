//! Infrastructure adapters for pending-task storage and managed resources.

pub mod queue;
pub mod resource;
pub use queue::PendingQueue;
pub use resource::LoopbackPeer;
