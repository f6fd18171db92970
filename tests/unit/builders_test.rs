//! Tests for queue builder

use std::sync::Arc;
use std::time::Duration;

use signaling_queue::builders::{PlatformDetector, QueueBuilder, StandardPlatform};
use signaling_queue::config::QueueConfig;
use signaling_queue::core::{
    AuditAction, AuditSink, InMemoryAuditSink, ManagedResource, OperationSpec, QueueError,
    ResourceOperation, SignalingQueue,
};
use signaling_queue::infra::LoopbackPeer;
use signaling_queue::runtime::TokioSpawner;

fn peer() -> Arc<LoopbackPeer> {
    Arc::new(LoopbackPeer::new())
}

#[tokio::test]
async fn test_default_operations_registered() {
    let peer = peer();
    let queue = SignalingQueue::new(peer as Arc<dyn ManagedResource>).unwrap();
    assert_eq!(
        queue.operation_names(),
        vec![
            "apply-candidate",
            "create-answer",
            "create-offer",
            "set-local-description",
            "set-remote-description",
        ]
    );
}

#[tokio::test]
async fn test_without_default_operations() {
    let queue = QueueBuilder::new(peer() as Arc<dyn ManagedResource>)
        .without_default_operations()
        .build()
        .unwrap();
    assert!(queue.operation_names().is_empty());
    assert!(matches!(
        queue.create_offer(None),
        Err(QueueError::UnknownOperation(_))
    ));
}

#[test]
fn test_build_outside_runtime_fails() {
    let result = QueueBuilder::new(peer() as Arc<dyn ManagedResource>).build();
    assert!(matches!(result, Err(QueueError::Config(_))));
}

#[test]
fn test_build_with_explicit_spawner() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let queue = QueueBuilder::new(peer() as Arc<dyn ManagedResource>)
        .spawner(TokioSpawner::new(runtime.handle().clone()))
        .build()
        .unwrap();
    assert_eq!(queue.config(), &QueueConfig::default());
}

#[tokio::test]
async fn test_custom_config_is_applied() {
    let config = QueueConfig::from_json_str(r#"{"retry_delay_ms": 20, "settle_delay_ms": 1}"#)
        .unwrap();
    let queue = QueueBuilder::new(peer() as Arc<dyn ManagedResource>)
        .config(config.clone())
        .build()
        .unwrap();
    assert_eq!(queue.config(), &config);
}

#[tokio::test(start_paused = true)]
async fn test_audit_sink_records_lifecycle() {
    let peer = peer();
    peer.install("noop", ResourceOperation::callback(|_, cb| cb.succeed(vec![])));
    peer.fail_with("boom", "nope");
    let audit = Arc::new(InMemoryAuditSink::new(32));
    let queue = QueueBuilder::new(Arc::clone(&peer) as Arc<dyn ManagedResource>)
        .audit_sink(Arc::clone(&audit) as Arc<dyn AuditSink>)
        .without_default_operations()
        .build()
        .unwrap();
    queue.register(OperationSpec::invoke("noop"));
    queue.register(OperationSpec::invoke("boom"));

    let ok = queue.call("noop", vec![]).unwrap();
    let bad = queue.call("boom", vec![]).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        audit.actions_for(ok),
        vec![AuditAction::Enqueue, AuditAction::Start, AuditAction::Complete]
    );
    assert_eq!(
        audit.actions_for(bad),
        vec![AuditAction::Enqueue, AuditAction::Start, AuditAction::Fail]
    );
    let fail = audit
        .events()
        .into_iter()
        .find(|e| e.action == AuditAction::Fail)
        .unwrap();
    assert_eq!(fail.detail.as_deref(), Some("operation `boom` failed: nope"));
}

#[test]
fn test_standard_platform_defers_to_standard_factories() {
    let platform = StandardPlatform;
    assert_eq!(platform.name(), "standard");
    assert!(platform.candidate_factory().is_none());
    assert!(platform.description_factory().is_none());
}
