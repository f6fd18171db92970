//! Debounced, re-armable one-shot poll timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::runtime::TokioSpawner;

#[derive(Default)]
struct TriggerState {
    generation: u64,
    pending: Option<AbortHandle>,
}

/// At most one pending invocation at a time.
///
/// Arming cancels whatever was pending and schedules exactly one call after
/// the new delay, so bursts of enqueue/settle events coalesce into one poll.
pub struct PollTrigger {
    spawner: TokioSpawner,
    state: Arc<Mutex<TriggerState>>,
}

impl PollTrigger {
    /// Trigger that schedules on `spawner`.
    #[must_use]
    pub fn new(spawner: TokioSpawner) -> Self {
        Self {
            spawner,
            state: Arc::new(Mutex::new(TriggerState::default())),
        }
    }

    /// Cancel any pending arm and run `f` once after `delay`.
    pub fn arm<F>(&self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        if let Some(previous) = state.pending.take() {
            previous.abort();
        }
        state.generation += 1;
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let handle = self.spawner.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = shared.lock();
                // a later arm owns the slot now
                if state.generation == generation {
                    state.pending = None;
                }
            }
            f();
        });
        state.pending = Some(handle.abort_handle());
    }

    /// Drop the pending arm, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.state.lock().pending.take() {
            pending.abort();
        }
    }

    /// True while an invocation is scheduled and has not fired.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

impl Drop for PollTrigger {
    fn drop(&mut self) {
        self.cancel();
    }
}
