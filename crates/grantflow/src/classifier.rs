//! Decides, per capability and current environment, what the sequencer must do.

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::permissions::RationaleTracker;
use crate::platform::{Environment, SettingsTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    AlreadySatisfied,
    /// Prompt for these platform permissions.
    NeedsPrompt { permissions: Vec<String> },
    NeedsSettingsNavigation(SettingsTarget),
}

/// State of one platform permission as far as prompting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    Granted,
    FirstTime,
    CanRetry,
    PermanentlyDenied,
}

impl RuntimeState {
    /// Folds the states of a capability's permissions into one.
    pub fn fold(states: &[RuntimeState]) -> RuntimeState {
        if states.iter().all(|state| *state == RuntimeState::Granted) {
            RuntimeState::Granted
        } else if states.contains(&RuntimeState::PermanentlyDenied) {
            RuntimeState::PermanentlyDenied
        } else if states.contains(&RuntimeState::CanRetry) {
            RuntimeState::CanRetry
        } else {
            RuntimeState::FirstTime
        }
    }
}

/// Current state of `permission`. Marks the tracker when the platform asks
/// for a rationale.
pub fn runtime_state(
    env: &dyn Environment,
    permission: &str,
    tracker: &mut RationaleTracker,
) -> RuntimeState {
    if env.is_permission_granted(permission) {
        return RuntimeState::Granted;
    }
    if env.should_show_rationale(permission) {
        tracker.mark_shown(permission);
        return RuntimeState::CanRetry;
    }
    if tracker.was_shown(permission) {
        RuntimeState::PermanentlyDenied
    } else {
        RuntimeState::FirstTime
    }
}

/// Classifies `capability` against the environment as it is right now.
pub fn classify(
    capability: &Capability,
    env: &dyn Environment,
    package_name: Option<&str>,
    tracker: &mut RationaleTracker,
) -> Classification {
    match capability {
        Capability::Prompt(prompt) => {
            let permissions = prompt.effective_permissions(env.api_level());
            let states: Vec<RuntimeState> = permissions
                .iter()
                .map(|permission| runtime_state(env, permission, tracker))
                .collect();
            match RuntimeState::fold(&states) {
                RuntimeState::Granted => Classification::AlreadySatisfied,
                RuntimeState::FirstTime | RuntimeState::CanRetry => Classification::NeedsPrompt {
                    permissions: permissions
                        .iter()
                        .zip(&states)
                        .filter(|(_, state)| **state != RuntimeState::Granted)
                        .map(|(permission, _)| permission.to_string())
                        .collect(),
                },
                RuntimeState::PermanentlyDenied => Classification::NeedsSettingsNavigation(
                    SettingsTarget::app_details(package_name),
                ),
            }
        }
        Capability::Settings(settings) => {
            if env.is_setting_enabled(settings.action) {
                Classification::AlreadySatisfied
            } else {
                Classification::NeedsSettingsNavigation(settings.target(package_name))
            }
        }
    }
}
