//! Tests for audit sink

use signaling_queue::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(1, "create-offer", AuditAction::Enqueue, None);
    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0], event);
    assert_eq!(events[0].task_id, 1);
    assert_eq!(events[0].action, AuditAction::Enqueue);
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(1, "create-offer", AuditAction::Enqueue, None));
    sink.record(build_audit_event(2, "create-offer", AuditAction::Enqueue, None));
    sink.record(build_audit_event(3, "create-offer", AuditAction::Enqueue, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].task_id, 2); // First one popped
    assert_eq!(events[1].task_id, 3);
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(
        7,
        "set-remote-description",
        AuditAction::Fail,
        Some("bad sdp".to_string()),
    );

    assert_eq!(event.task_id, 7);
    assert_eq!(event.operation, "set-remote-description");
    assert_eq!(event.action, AuditAction::Fail);
    assert_eq!(event.detail, Some("bad sdp".to_string()));
    assert!(event.created_at_ms > 0);
    assert!(uuid::Uuid::parse_str(&event.event_id).is_ok());
}

#[test]
fn test_actions_for_filters_by_task() {
    let sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event(1, "a", AuditAction::Enqueue, None));
    sink.record(build_audit_event(2, "b", AuditAction::Enqueue, None));
    sink.record(build_audit_event(1, "a", AuditAction::Start, None));
    sink.record(build_audit_event(1, "a", AuditAction::Complete, None));

    assert_eq!(
        sink.actions_for(1),
        vec![AuditAction::Enqueue, AuditAction::Start, AuditAction::Complete]
    );
    assert_eq!(sink.actions_for(2), vec![AuditAction::Enqueue]);
    assert_eq!(AuditAction::Complete.to_string(), "complete");
}
