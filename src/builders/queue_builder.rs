//! Assemble a [`SignalingQueue`] from configuration, a resource and its collaborators.

use std::sync::Arc;

use tracing::debug;

use crate::config::QueueConfig;
use crate::core::{
    default_operations, standard_candidate_factory, standard_description_factory, AuditSink,
    CandidateFactory, DescriptionFactory, EventSink, ExecutionContext, ManagedResource,
    NullEventSink, QueueError, QueueParts, SignalingQueue,
};
use crate::runtime::TokioSpawner;

/// Chooses payload factories for a flavour of managed resource.
///
/// Return `None` to fall back to the standard serde-based factory.
pub trait PlatformDetector: Send + Sync {
    /// Flavour name, for logs.
    fn name(&self) -> &str;

    /// Candidate factory for this flavour.
    fn candidate_factory(&self) -> Option<CandidateFactory> {
        None
    }

    /// Description factory for this flavour.
    fn description_factory(&self) -> Option<DescriptionFactory> {
        None
    }
}

/// Plain JSON payloads; uses the standard factories.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPlatform;

impl PlatformDetector for StandardPlatform {
    fn name(&self) -> &str {
        "standard"
    }
}

/// Builder for [`SignalingQueue`].
///
/// Factories resolve in order: explicitly set, then the detector's, then
/// the standard ones.
pub struct QueueBuilder {
    resource: Arc<dyn ManagedResource>,
    config: QueueConfig,
    events: Option<Arc<dyn EventSink>>,
    audit: Option<Arc<dyn AuditSink>>,
    candidates: Option<CandidateFactory>,
    descriptions: Option<DescriptionFactory>,
    detector: Arc<dyn PlatformDetector>,
    spawner: Option<TokioSpawner>,
    default_operations: bool,
}

impl QueueBuilder {
    /// Builder over `resource` with default configuration.
    #[must_use]
    pub fn new(resource: Arc<dyn ManagedResource>) -> Self {
        Self {
            resource,
            config: QueueConfig::default(),
            events: None,
            audit: None,
            candidates: None,
            descriptions: None,
            detector: Arc::new(StandardPlatform),
            spawner: None,
            default_operations: true,
        }
    }

    /// Use `config` instead of the defaults.
    #[must_use]
    pub fn config(mut self, config: QueueConfig) -> Self {
        self.config = config;
        self
    }

    /// Deliver notifications to `sink`. Without one, events are discarded.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Record task lifecycle actions to `sink`.
    #[must_use]
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Override the candidate factory.
    #[must_use]
    pub fn candidate_factory(mut self, factory: CandidateFactory) -> Self {
        self.candidates = Some(factory);
        self
    }

    /// Override the description factory.
    #[must_use]
    pub fn description_factory(mut self, factory: DescriptionFactory) -> Self {
        self.descriptions = Some(factory);
        self
    }

    /// Resource flavour used to pick factories not set explicitly.
    #[must_use]
    pub fn detector(mut self, detector: Arc<dyn PlatformDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Run timers and task bodies on `spawner` instead of the current runtime.
    #[must_use]
    pub fn spawner(mut self, spawner: TokioSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Skip registering the five signaling operations.
    #[must_use]
    pub const fn without_default_operations(mut self) -> Self {
        self.default_operations = false;
        self
    }

    /// Validate configuration and build the queue.
    ///
    /// # Errors
    ///
    /// [`QueueError::Config`] for invalid configuration, or when no spawner
    /// was given and the caller is outside a tokio runtime.
    pub fn build(self) -> Result<SignalingQueue, QueueError> {
        self.config.validate().map_err(QueueError::Config)?;
        let spawner = match self.spawner {
            Some(spawner) => spawner,
            None => TokioSpawner::current()?,
        };

        let candidates = self
            .candidates
            .or_else(|| self.detector.candidate_factory())
            .unwrap_or_else(standard_candidate_factory);
        let descriptions = self
            .descriptions
            .or_else(|| self.detector.description_factory())
            .unwrap_or_else(standard_description_factory);
        let events = self
            .events
            .unwrap_or_else(|| Arc::new(NullEventSink) as Arc<dyn EventSink>);

        debug!(
            platform = self.detector.name(),
            retry_ms = self.config.retry_delay_ms,
            settle_ms = self.config.settle_delay_ms,
            "building signaling queue"
        );

        let queue = SignalingQueue::from_parts(QueueParts {
            config: self.config,
            context: ExecutionContext::new(self.resource, candidates, events),
            audit: self.audit,
            spawner,
        });
        if self.default_operations {
            for op in default_operations(descriptions) {
                queue.register(op);
            }
        }
        Ok(queue)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::core::InMemoryEventSink;
    use crate::infra::resource::LoopbackPeer;
    use crate::util::serde::{IceCandidate, SdpType, SessionDescription};

    struct Prefixed;

    impl PlatformDetector for Prefixed {
        fn name(&self) -> &str {
            "prefixed"
        }

        fn candidate_factory(&self) -> Option<CandidateFactory> {
            Some(Arc::new(|raw: &Value| {
                let text = raw["candidate"].as_str().unwrap_or_default();
                Ok(IceCandidate::new(format!("candidate:{text}")))
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_detector_factory_is_used() {
        let peer = Arc::new(LoopbackPeer::new());
        peer.force_remote_description(SessionDescription::new(SdpType::Answer, "v=0"));
        let events = Arc::new(InMemoryEventSink::new(4));
        let queue = QueueBuilder::new(Arc::clone(&peer) as Arc<dyn ManagedResource>)
            .detector(Arc::new(Prefixed))
            .event_sink(Arc::clone(&events) as Arc<dyn EventSink>)
            .build()
            .unwrap();

        queue.apply_candidate(json!({"candidate": "1 1 udp 1 host"})).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(
            peer.candidates(),
            vec![IceCandidate::new("candidate:1 1 udp 1 host")]
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let peer = Arc::new(LoopbackPeer::new());
        let config = QueueConfig {
            retry_delay_ms: 0,
            ..QueueConfig::default()
        };
        let result = QueueBuilder::new(peer as Arc<dyn ManagedResource>)
            .config(config)
            .build();
        assert!(matches!(result, Err(QueueError::Config(_))));
    }
}
