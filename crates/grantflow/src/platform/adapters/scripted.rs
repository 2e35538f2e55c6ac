//! Deterministic environment driven by pre-recorded user answers.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Environment;
use crate::capability::Capability;
use crate::error::{GrantError, GrantResult};
use crate::platform::types::{Interaction, PromptGrants, SettingsTarget};

pub const DEFAULT_API_LEVEL: u32 = 34;

#[derive(Debug, Default)]
struct ScriptState {
    granted: BTreeSet<String>,
    enabled: BTreeSet<String>,
    denials: BTreeMap<String, u32>,
    prompt_answers: BTreeMap<String, VecDeque<bool>>,
    settings_answers: BTreeMap<String, bool>,
    app_details_grants: BTreeSet<String>,
    failing_targets: Vec<SettingsTarget>,
    interactions: Vec<Interaction>,
}

/// Scripted [`Environment`]. Prompt answers are consumed per permission in
/// the order they were queued; an unanswered prompt counts as a denial.
/// A permission denied once asks for a rationale, denied twice it never does
/// again.
#[derive(Debug)]
pub struct ScriptedEnvironment {
    api_level: u32,
    state: Mutex<ScriptState>,
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self::new(DEFAULT_API_LEVEL)
    }
}

impl ScriptedEnvironment {
    pub fn new(api_level: u32) -> Self {
        Self {
            api_level,
            state: Mutex::new(ScriptState::default()),
        }
    }

    pub fn grant_permission(&self, permission: &str) {
        self.state.lock().granted.insert(permission.to_string());
    }

    pub fn revoke_permission(&self, permission: &str) {
        self.state.lock().granted.remove(permission);
    }

    pub fn enable_setting(&self, action: &str) {
        self.state.lock().enabled.insert(action.to_string());
    }

    /// Marks a capability as already granted at the platform level.
    pub fn grant(&self, capability: &Capability) {
        match capability {
            Capability::Prompt(prompt) => {
                for permission in prompt.effective_permissions(self.api_level) {
                    self.grant_permission(permission);
                }
            }
            Capability::Settings(settings) => self.enable_setting(settings.action),
        }
    }

    /// Records previous denials of `permission`, as if from earlier sessions.
    pub fn set_denials(&self, permission: &str, count: u32) {
        self.state
            .lock()
            .denials
            .insert(permission.to_string(), count);
    }

    pub fn answer_prompt(&self, permission: &str, granted: bool) {
        self.state
            .lock()
            .prompt_answers
            .entry(permission.to_string())
            .or_default()
            .push_back(granted);
    }

    /// Queues the user's answer for whatever a capability needs: one prompt
    /// answer per effective permission, or the toggle on its settings surface.
    pub fn answer(&self, capability: &Capability, granted: bool) {
        match capability {
            Capability::Prompt(prompt) => {
                for permission in prompt.effective_permissions(self.api_level) {
                    self.answer_prompt(permission, granted);
                }
            }
            Capability::Settings(settings) => self.answer_settings(settings.action, granted),
        }
    }

    /// What the user does on the surface for `action` once navigated there.
    pub fn answer_settings(&self, action: &str, enable: bool) {
        self.state
            .lock()
            .settings_answers
            .insert(action.to_string(), enable);
    }

    /// Permissions the user turns on from the application-details surface.
    pub fn grant_on_app_details(&self, permission: &str) {
        self.state
            .lock()
            .app_details_grants
            .insert(permission.to_string());
    }

    pub fn fail_navigation(&self, target: SettingsTarget) {
        self.state.lock().failing_targets.push(target);
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().interactions.clone()
    }

    pub fn prompt_count(&self) -> usize {
        self.state
            .lock()
            .interactions
            .iter()
            .filter(|interaction| matches!(interaction, Interaction::Prompt { .. }))
            .count()
    }

    pub fn navigation_count(&self) -> usize {
        self.state
            .lock()
            .interactions
            .iter()
            .filter(|interaction| matches!(interaction, Interaction::Navigate { .. }))
            .count()
    }
}

#[async_trait]
impl Environment for ScriptedEnvironment {
    fn id(&self) -> &str {
        "scripted"
    }

    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn is_permission_granted(&self, permission: &str) -> bool {
        self.state.lock().granted.contains(permission)
    }

    fn is_setting_enabled(&self, action: &str) -> bool {
        self.state.lock().enabled.contains(action)
    }

    fn should_show_rationale(&self, permission: &str) -> bool {
        let state = self.state.lock();
        !state.granted.contains(permission) && state.denials.get(permission) == Some(&1)
    }

    async fn request_prompt(&self, permissions: &[String]) -> GrantResult<PromptGrants> {
        let mut state = self.state.lock();
        state.interactions.push(Interaction::Prompt {
            permissions: permissions.to_vec(),
        });

        let mut grants = PromptGrants::new();
        for permission in permissions {
            let granted = state
                .prompt_answers
                .get_mut(permission)
                .and_then(VecDeque::pop_front)
                .unwrap_or(false);
            if granted {
                state.granted.insert(permission.clone());
            } else {
                *state.denials.entry(permission.clone()).or_insert(0) += 1;
            }
            grants.insert(permission.clone(), granted);
        }
        Ok(grants)
    }

    fn navigate_to_settings(&self, target: &SettingsTarget) -> GrantResult<()> {
        let mut state = self.state.lock();
        state.interactions.push(Interaction::Navigate {
            target: target.clone(),
        });

        if state.failing_targets.contains(target) {
            return Err(GrantError::Environment(format!(
                "no surface handles {}",
                target.action
            )));
        }

        if target.action == crate::capability::manifest::ACTION_APPLICATION_DETAILS_SETTINGS {
            let grants: Vec<String> = state.app_details_grants.iter().cloned().collect();
            state.granted.extend(grants);
        } else if state.settings_answers.get(&target.action) == Some(&true) {
            state.enabled.insert(target.action.clone());
        }
        Ok(())
    }
}
