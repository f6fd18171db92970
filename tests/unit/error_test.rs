//! Tests for error types

use signaling_queue::core::QueueError;

#[test]
fn test_unsupported_operation_error() {
    let err = QueueError::UnsupportedOperation("create-offer".to_string());
    assert_eq!(format!("{}", err), "unsupported operation: create-offer");
}

#[test]
fn test_execution_error() {
    let err = QueueError::execution("set-remote-description", "bad sdp");
    assert_eq!(
        format!("{}", err),
        "operation `set-remote-description` failed: bad sdp"
    );
}

#[test]
fn test_malformed_payload_error() {
    let err = QueueError::MalformedPayload("missing type".to_string());
    assert_eq!(format!("{}", err), "malformed payload: missing type");
}

#[test]
fn test_unknown_operation_error() {
    let err = QueueError::UnknownOperation("renegotiate".to_string());
    assert_eq!(format!("{}", err), "unknown operation: renegotiate");
}

#[test]
fn test_config_error() {
    let err = QueueError::Config("no tokio runtime".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: no tokio runtime");
}
