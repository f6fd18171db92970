//! Managed resource adapters.

pub mod memory;

pub use memory::LoopbackPeer;
