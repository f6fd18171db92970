//! Dynamic ranking of pending tasks.
//!
//! Rank is never stored on a task. It is recomputed from the live resource
//! snapshot every time two tasks are compared, so the effective order of the
//! queue can change between polls without anything being added or removed.

use std::cmp::Ordering;

use crate::core::operations::{
    APPLY_CANDIDATE, CREATE_ANSWER, CREATE_OFFER, SET_LOCAL_DESCRIPTION, SET_REMOTE_DESCRIPTION,
};
use crate::core::{ResourceSnapshot, Task};

/// Default static ordering, most important first.
pub const DEFAULT_PRIORITIES: [&str; 5] = [
    APPLY_CANDIDATE,
    SET_LOCAL_DESCRIPTION,
    SET_REMOTE_DESCRIPTION,
    CREATE_ANSWER,
    CREATE_OFFER,
];

/// Ordering key of a pending task. Lower runs earlier.
///
/// Variant order is significant: any listed name beats an unlisted one, and
/// any ready task beats one whose checks fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    /// Ready, at this position in the priority table.
    Listed(usize),
    /// Ready, name absent from the table.
    Default,
    /// Readiness checks currently fail.
    Wait,
}

impl Rank {
    /// True unless the task is waiting on its checks.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        !matches!(self, Self::Wait)
    }
}

/// Static name → position table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    names: Vec<String>,
}

impl PriorityTable {
    /// Build a table from names in priority order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `name`, if listed.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Names in priority order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITIES)
    }
}

/// Ranks tasks against a resource snapshot.
#[derive(Debug, Clone, Default)]
pub struct PriorityComparator {
    table: PriorityTable,
}

impl PriorityComparator {
    /// Comparator over the given table.
    #[must_use]
    pub const fn new(table: PriorityTable) -> Self {
        Self { table }
    }

    /// Underlying table.
    #[must_use]
    pub const fn table(&self) -> &PriorityTable {
        &self.table
    }

    /// Rank of `task` right now. Evaluates the task's readiness checks.
    #[must_use]
    pub fn rank(&self, task: &Task, snapshot: &ResourceSnapshot) -> Rank {
        if !task.is_ready(snapshot) {
            return Rank::Wait;
        }
        self.table
            .position(task.name())
            .map_or(Rank::Default, Rank::Listed)
    }

    /// Order `a` relative to `b`; `Less` means `a` runs first.
    #[must_use]
    pub fn compare(&self, a: &Task, b: &Task, snapshot: &ResourceSnapshot) -> Ordering {
        self.rank(a, snapshot).cmp(&self.rank(b, snapshot))
    }
}
