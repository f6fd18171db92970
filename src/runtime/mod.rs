//! Runtime adapters: tokio spawning and the poll timer.

pub mod tokio_spawner;
pub mod trigger;

pub use tokio_spawner::TokioSpawner;
pub use trigger::PollTrigger;
