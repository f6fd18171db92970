//! Tests for utility functions

use serde_json::json;
use signaling_queue::util::{now_ms, IceCandidate, SdpType, SessionDescription, SignalingState};

#[test]
fn test_signaling_state_round_names() {
    for state in [
        SignalingState::Stable,
        SignalingState::HaveLocalOffer,
        SignalingState::HaveRemoteOffer,
        SignalingState::HaveLocalPranswer,
        SignalingState::HaveRemotePranswer,
        SignalingState::Closed,
    ] {
        let wire = serde_json::to_value(state).unwrap();
        assert_eq!(wire, json!(state.as_str()));
    }
    assert_eq!(SignalingState::default(), SignalingState::Stable);
}

#[test]
fn test_session_description_type_field() {
    let desc = SessionDescription::new(SdpType::Pranswer, "v=0");
    assert_eq!(
        serde_json::to_value(&desc).unwrap(),
        json!({"type": "pranswer", "sdp": "v=0"})
    );
}

#[test]
fn test_ice_candidate_skips_absent_fields() {
    let candidate = IceCandidate::new("candidate:0 1 UDP 1 127.0.0.1 9 typ host");
    assert_eq!(
        serde_json::to_value(&candidate).unwrap(),
        json!({"candidate": "candidate:0 1 UDP 1 127.0.0.1 9 typ host"})
    );
}

#[test]
fn test_now_ms_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}
