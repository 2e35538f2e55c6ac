use serde::{Deserialize, Serialize};

use crate::capability::CapabilityId;
use crate::platform::SettingsTarget;
use crate::session::aggregator::Outcome;
use crate::session::config::Theme;
use crate::session::state::{GrantStatus, Group};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GrantEvent {
    SessionStarted(SessionStartedPayload),
    CapabilityResolved(CapabilityResolvedPayload),
    SessionSuspended(SessionSuspendedPayload),
    SessionResumed(SessionResumedPayload),
    SessionCompleted(SessionCompletedPayload),
    SessionAbandoned(SessionAbandonedPayload),
}

impl GrantEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GrantEvent::SessionStarted(_) => "session_started",
            GrantEvent::CapabilityResolved(_) => "capability_resolved",
            GrantEvent::SessionSuspended(_) => "session_suspended",
            GrantEvent::SessionResumed(_) => "session_resumed",
            GrantEvent::SessionCompleted(_) => "session_completed",
            GrantEvent::SessionAbandoned(_) => "session_abandoned",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            GrantEvent::SessionStarted(payload) => &payload.session_id,
            GrantEvent::CapabilityResolved(payload) => &payload.session_id,
            GrantEvent::SessionSuspended(payload) => &payload.session_id,
            GrantEvent::SessionResumed(payload) => &payload.session_id,
            GrantEvent::SessionCompleted(payload) => &payload.session_id,
            GrantEvent::SessionAbandoned(payload) => &payload.session_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStartedPayload {
    pub session_id: String,
    pub app_name: String,
    pub theme: Theme,
    pub required: Vec<CapabilityId>,
    pub optional: Vec<CapabilityId>,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityResolvedPayload {
    pub session_id: String,
    pub capability: CapabilityId,
    pub group: Group,
    pub status: GrantStatus,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSuspendedPayload {
    pub session_id: String,
    pub suspension: u32,
    pub capability: CapabilityId,
    pub target: SettingsTarget,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResumedPayload {
    pub session_id: String,
    pub suspension: u32,
    pub capability: Option<CapabilityId>,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCompletedPayload {
    pub session_id: String,
    pub outcome: Outcome,
    pub optional_denied: Vec<CapabilityId>,
    pub at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    /// A newer check-and-show replaced the session.
    Superseded,
    /// The controlling surface was torn down for good.
    SurfaceDestroyed,
    /// The environment or storage failed mid-session.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAbandonedPayload {
    pub session_id: String,
    pub reason: AbandonReason,
    pub at: String,
}
