use serde::{Deserialize, Serialize};

use crate::capability::CapabilityId;
use crate::session::state::{GrantStatus, Group, SessionState};

/// The required capability that ended a session unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    pub session_id: String,
    pub capability: CapabilityId,
    pub status: GrantStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "denial", rename_all = "snake_case")]
pub enum Outcome {
    AllRequiredGranted,
    AnyRequiredDenied(Denial),
}

impl Outcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Outcome::AllRequiredGranted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub outcome: Outcome,
    pub optional_denied: Vec<CapabilityId>,
    /// False when a required denial stopped the session before every
    /// optional entry was reached.
    pub optional_attempted: bool,
}

/// Evaluates a finished (or short-circuited) session. Optional entries never
/// influence the outcome.
pub fn aggregate(state: &SessionState) -> SessionReport {
    let denial = state
        .items()
        .iter()
        .filter(|item| item.group == Group::Required)
        .find(|item| state.status(item.capability) != GrantStatus::Granted)
        .map(|item| Denial {
            session_id: state.session_id().to_string(),
            capability: item.capability,
            status: state.status(item.capability),
        });

    let optional: Vec<_> = state
        .items()
        .iter()
        .filter(|item| item.group == Group::Optional)
        .collect();
    let optional_denied = optional
        .iter()
        .filter(|item| state.status(item.capability) == GrantStatus::Denied)
        .map(|item| item.capability)
        .collect();
    let optional_attempted = optional
        .iter()
        .all(|item| state.status(item.capability).is_resolved());

    SessionReport {
        outcome: match denial {
            Some(denial) => Outcome::AnyRequiredDenied(denial),
            None => Outcome::AllRequiredGranted,
        },
        optional_denied,
        optional_attempted,
    }
}
