//! In-memory peer connection for development and testing.
//!
//! `LoopbackPeer` walks the offer/answer state machine without any media or
//! network. Description operations use the callback convention and
//! offer/answer creation uses the future convention, so both code paths of
//! the invocation strategy are exercised.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::core::operations::{
    CREATE_ANSWER, CREATE_OFFER, SET_LOCAL_DESCRIPTION, SET_REMOTE_DESCRIPTION,
};
use crate::core::{Callbacks, ManagedResource, ResourceOperation, ResourceSnapshot};
use crate::util::serde::{IceCandidate, SdpType, SessionDescription, SignalingState};

/// Name recorded in [`LoopbackPeer::calls`] for candidate application.
pub const ADD_ICE_CANDIDATE: &str = "add-ice-candidate";

#[derive(Default)]
struct PeerState {
    signaling: SignalingState,
    local: Option<SessionDescription>,
    remote: Option<SessionDescription>,
    candidates: Vec<IceCandidate>,
    calls: Vec<String>,
    overrides: HashMap<String, ResourceOperation>,
    disabled: HashSet<String>,
    generated: u32,
}

impl PeerState {
    fn ensure_open(&self) -> Result<(), String> {
        if self.signaling.is_closed() {
            return Err("peer connection is closed".into());
        }
        Ok(())
    }

    fn create(&mut self, kind: SdpType) -> Result<Vec<Value>, String> {
        self.ensure_open()?;
        if kind == SdpType::Answer && self.signaling != SignalingState::HaveRemoteOffer {
            return Err(format!("cannot create answer in state {}", self.signaling));
        }
        self.generated += 1;
        let desc = SessionDescription::new(
            kind,
            format!("v=0\r\no=loopback {} 1 IN IP4 127.0.0.1\r\ns=-\r\n", self.generated),
        );
        let value = serde_json::to_value(desc).map_err(|e| e.to_string())?;
        Ok(vec![value])
    }

    fn apply_local(&mut self, arg: Option<&Value>) -> Result<(), String> {
        self.ensure_open()?;
        let desc = parse_description(arg)?;
        let next = match (desc.kind, self.signaling) {
            (SdpType::Offer, SignalingState::Stable | SignalingState::HaveLocalOffer) => {
                SignalingState::HaveLocalOffer
            }
            (
                SdpType::Answer,
                SignalingState::HaveRemoteOffer | SignalingState::HaveLocalPranswer,
            ) => SignalingState::Stable,
            (SdpType::Pranswer, SignalingState::HaveRemoteOffer) => {
                SignalingState::HaveLocalPranswer
            }
            (SdpType::Rollback, _) => SignalingState::Stable,
            (kind, state) => {
                return Err(format!("cannot set local {kind:?} in state {state}"));
            }
        };
        self.signaling = next;
        if desc.kind == SdpType::Rollback {
            self.local = None;
        } else {
            self.local = Some(desc);
        }
        Ok(())
    }

    fn apply_remote(&mut self, arg: Option<&Value>) -> Result<(), String> {
        self.ensure_open()?;
        let desc = parse_description(arg)?;
        let next = match (desc.kind, self.signaling) {
            (SdpType::Offer, SignalingState::Stable | SignalingState::HaveRemoteOffer) => {
                SignalingState::HaveRemoteOffer
            }
            (
                SdpType::Answer,
                SignalingState::HaveLocalOffer | SignalingState::HaveRemotePranswer,
            ) => SignalingState::Stable,
            (SdpType::Pranswer, SignalingState::HaveLocalOffer) => {
                SignalingState::HaveRemotePranswer
            }
            (SdpType::Rollback, _) => SignalingState::Stable,
            (kind, state) => {
                return Err(format!("cannot set remote {kind:?} in state {state}"));
            }
        };
        self.signaling = next;
        if desc.kind == SdpType::Rollback {
            self.remote = None;
        } else {
            self.remote = Some(desc);
        }
        Ok(())
    }
}

fn parse_description(arg: Option<&Value>) -> Result<SessionDescription, String> {
    let raw = arg.ok_or("missing session description")?;
    serde_json::from_value(raw.clone()).map_err(|e| format!("invalid session description: {e}"))
}

/// Simulated peer connection.
#[derive(Default)]
pub struct LoopbackPeer {
    state: Arc<Mutex<PeerState>>,
    stalled: Arc<Mutex<Vec<Callbacks>>>,
}

impl LoopbackPeer {
    /// A fresh peer in the stable state with no descriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the terminal state.
    pub fn close(&self) {
        self.state.lock().signaling = SignalingState::Closed;
    }

    /// Operation names requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Candidates applied so far.
    #[must_use]
    pub fn candidates(&self) -> Vec<IceCandidate> {
        self.state.lock().candidates.clone()
    }

    /// Current local description.
    #[must_use]
    pub fn local_description(&self) -> Option<SessionDescription> {
        self.state.lock().local.clone()
    }

    /// Current remote description.
    #[must_use]
    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.state.lock().remote.clone()
    }

    /// Record a remote description without going through the queue.
    pub fn force_remote_description(&self, desc: SessionDescription) {
        self.state.lock().remote = Some(desc);
    }

    /// Replace or add an operation.
    pub fn install(&self, name: impl Into<String>, operation: ResourceOperation) {
        let name = name.into();
        let mut state = self.state.lock();
        state.disabled.remove(&name);
        state.overrides.insert(name, operation);
    }

    /// Make an operation unavailable.
    pub fn disable(&self, name: impl Into<String>) {
        self.state.lock().disabled.insert(name.into());
    }

    /// Make an operation fail with `message`.
    pub fn fail_with(&self, name: impl Into<String>, message: impl Into<String>) {
        let message: String = message.into();
        self.install(
            name,
            ResourceOperation::callback(move |_, cb| cb.fail(message.clone())),
        );
    }

    /// Make an operation never settle until [`LoopbackPeer::release_stalled`].
    pub fn stall(&self, name: impl Into<String>) {
        let stalled = Arc::clone(&self.stalled);
        self.install(
            name,
            ResourceOperation::callback(move |_, cb| stalled.lock().push(cb)),
        );
    }

    /// Settle every stalled call successfully. Returns how many were released.
    pub fn release_stalled(&self) -> usize {
        let pending: Vec<Callbacks> = std::mem::take(&mut *self.stalled.lock());
        for cb in &pending {
            cb.succeed(Vec::new());
        }
        pending.len()
    }

    fn builtin(&self, name: &str) -> Option<ResourceOperation> {
        let shared = Arc::clone(&self.state);
        let op = match name {
            CREATE_OFFER | CREATE_ANSWER => {
                let kind = if name == CREATE_OFFER {
                    SdpType::Offer
                } else {
                    SdpType::Answer
                };
                ResourceOperation::future(move |_args| {
                    let result = shared.lock().create(kind);
                    async move { result }
                })
            }
            SET_LOCAL_DESCRIPTION => ResourceOperation::callback(move |args, cb| {
                let result = shared.lock().apply_local(args.first());
                match result {
                    Ok(()) => cb.succeed(Vec::new()),
                    Err(e) => cb.fail(e),
                }
            }),
            SET_REMOTE_DESCRIPTION => ResourceOperation::callback(move |args, cb| {
                let result = shared.lock().apply_remote(args.first());
                match result {
                    Ok(()) => cb.succeed(Vec::new()),
                    Err(e) => cb.fail(e),
                }
            }),
            _ => return None,
        };
        Some(op)
    }
}

#[async_trait]
impl ManagedResource for LoopbackPeer {
    fn snapshot(&self) -> ResourceSnapshot {
        let state = self.state.lock();
        ResourceSnapshot {
            signaling_state: state.signaling,
            has_local_description: state.local.is_some(),
            has_remote_description: state.remote.is_some(),
        }
    }

    fn operation(&self, name: &str) -> Option<ResourceOperation> {
        let op = {
            let state = self.state.lock();
            if state.disabled.contains(name) {
                return None;
            }
            state.overrides.get(name).cloned()
        };
        let op = op.or_else(|| self.builtin(name))?;
        self.state.lock().calls.push(name.to_string());
        Some(op)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), String> {
        let mut state = self.state.lock();
        state.calls.push(ADD_ICE_CANDIDATE.to_string());
        state.ensure_open()?;
        if state.local.is_none() && state.remote.is_none() {
            return Err("no description applied".into());
        }
        if candidate.candidate.trim().is_empty() {
            return Err("empty candidate".into());
        }
        state.candidates.push(candidate);
        Ok(())
    }
}
