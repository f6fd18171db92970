//! Pluggable constructors turning raw signaling payloads into domain objects.

use std::sync::Arc;

use serde_json::Value;

use crate::core::QueueError;
use crate::util::serde::{IceCandidate, SessionDescription};

/// Builds an [`IceCandidate`] from a raw candidate payload.
pub type CandidateFactory = Arc<dyn Fn(&Value) -> Result<IceCandidate, QueueError> + Send + Sync>;

/// Builds a [`SessionDescription`] from a raw description payload.
pub type DescriptionFactory =
    Arc<dyn Fn(&Value) -> Result<SessionDescription, QueueError> + Send + Sync>;

/// Deserialize the standard `{candidate, sdpMid, sdpMLineIndex}` shape.
#[must_use]
pub fn standard_candidate_factory() -> CandidateFactory {
    Arc::new(|raw| {
        serde_json::from_value(raw.clone())
            .map_err(|e| QueueError::MalformedPayload(format!("ice candidate: {e}")))
    })
}

/// Deserialize the standard `{type, sdp}` shape.
#[must_use]
pub fn standard_description_factory() -> DescriptionFactory {
    Arc::new(|raw| {
        serde_json::from_value(raw.clone())
            .map_err(|e| QueueError::MalformedPayload(format!("session description: {e}")))
    })
}
