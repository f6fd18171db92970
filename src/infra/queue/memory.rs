//! In-memory pending set with rank-at-peek selection.

use crate::core::{PriorityComparator, Rank, ResourceSnapshot, Task};
use crate::util::serde::TaskId;

/// Pending tasks in enqueue order.
///
/// Rank depends on live resource state, so selection scans and re-ranks on
/// every peek instead of ordering at insertion time.
#[derive(Debug, Default)]
pub struct PendingQueue {
    tasks: Vec<Task>,
}

impl PendingQueue {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Append a task.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Index and rank of the best task under `snapshot`. Among equal ranks the
    /// earliest enqueued wins.
    #[must_use]
    pub fn peek_best(
        &self,
        comparator: &PriorityComparator,
        snapshot: &ResourceSnapshot,
    ) -> Option<(usize, Rank)> {
        let (index, task) = self
            .tasks
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| comparator.compare(a, b, snapshot))?;
        Some((index, comparator.rank(task, snapshot)))
    }

    /// Remove the task at `index`, keeping the order of the rest.
    pub fn take(&mut self, index: usize) -> Option<Task> {
        (index < self.tasks.len()).then(|| self.tasks.remove(index))
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Identifiers and names of pending tasks, in enqueue order.
    #[must_use]
    pub fn summary(&self) -> Vec<(TaskId, String)> {
        self.tasks
            .iter()
            .map(|t| (t.id(), t.name().to_string()))
            .collect()
    }
}
