//! Tests for event sinks and the event wire format

use serde_json::json;
use signaling_queue::core::{
    ChannelEventSink, EventSink, InMemoryEventSink, NullEventSink, QueueEvent,
};
use signaling_queue::util::serde::{SdpType, SessionDescription};

fn failed(task_id: u64) -> QueueEvent {
    QueueEvent::TaskFailed {
        task_id,
        operation: "create-offer".to_string(),
        error: "closed".to_string(),
    }
}

#[test]
fn test_in_memory_sink_overflow() {
    let sink = InMemoryEventSink::new(2);
    sink.emit(failed(1));
    sink.emit(failed(2));
    sink.emit(failed(3));
    assert_eq!(sink.events(), vec![failed(2), failed(3)]);
}

#[test]
fn test_null_sink_discards() {
    NullEventSink.emit(failed(1));
}

#[tokio::test]
async fn test_channel_sink_forwards() {
    let (sink, mut rx) = ChannelEventSink::channel();
    sink.emit(failed(4));
    assert_eq!(rx.recv().await, Some(failed(4)));

    drop(rx);
    // receiver gone: emitting must not panic
    sink.emit(failed(5));
}

#[test]
fn test_event_wire_format() {
    let event = QueueEvent::LocalDescriptionReady {
        description: SessionDescription::new(SdpType::Offer, "v=0"),
    };
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({
            "event": "local_description_ready",
            "description": {"type": "offer", "sdp": "v=0"}
        })
    );

    let rejected: QueueEvent = serde_json::from_value(json!({
        "event": "candidate_rejected",
        "candidate": {"candidate": ""},
        "reason": "empty candidate"
    }))
    .unwrap();
    assert!(matches!(rejected, QueueEvent::CandidateRejected { .. }));
}
