//! Readiness checks: named predicates over the resource snapshot.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::core::ResourceSnapshot;
use crate::util::serde::SignalingState;

type Predicate = Arc<dyn Fn(&ResourceSnapshot) -> bool + Send + Sync>;

/// A named predicate deciding whether a task may run against the current state.
#[derive(Clone)]
pub struct ReadinessCheck {
    name: Cow<'static, str>,
    predicate: Predicate,
}

impl ReadinessCheck {
    /// Build a check from a name and predicate.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&ResourceSnapshot) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Check name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the predicate.
    #[must_use]
    pub fn passes(&self, snapshot: &ResourceSnapshot) -> bool {
        (self.predicate)(snapshot)
    }

    /// Resource is not closed.
    #[must_use]
    pub fn not_closed() -> Self {
        Self::new("not-closed", |s| !s.signaling_state.is_closed())
    }

    /// Resource is not waiting on an answer to its own offer.
    #[must_use]
    pub fn not_negotiating() -> Self {
        Self::new("not-negotiating", |s| {
            s.signaling_state != SignalingState::HaveLocalOffer
        })
    }

    /// Resource is in the stable state.
    #[must_use]
    pub fn stable() -> Self {
        Self::new("stable", |s| s.signaling_state == SignalingState::Stable)
    }

    /// At least one local or remote description has been applied.
    #[must_use]
    pub fn has_local_or_remote_description() -> Self {
        Self::new("has-local-or-remote-description", |s| {
            s.has_local_description || s.has_remote_description
        })
    }
}

impl fmt::Debug for ReadinessCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// True iff every check passes. An empty set is vacuously ready.
#[must_use]
pub fn all_ready(checks: &[ReadinessCheck], snapshot: &ResourceSnapshot) -> bool {
    checks.iter().all(|check| check.passes(snapshot))
}
