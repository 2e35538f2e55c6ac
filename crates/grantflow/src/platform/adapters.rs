use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::Capability;
use crate::error::{GrantError, GrantResult};

use super::types::{PromptGrants, SettingsTarget};

/// Operating-environment boundary: platform-level truth about what is
/// granted, plus the two user-facing actions the sequencer issues.
#[async_trait]
pub trait Environment: Send + Sync {
    fn id(&self) -> &str {
        "unsupported"
    }

    fn api_level(&self) -> u32;
    fn is_permission_granted(&self, permission: &str) -> bool;
    fn is_setting_enabled(&self, action: &str) -> bool;

    /// Whether the platform would explain a permission before prompting again.
    fn should_show_rationale(&self, _permission: &str) -> bool {
        false
    }

    async fn request_prompt(&self, _permissions: &[String]) -> GrantResult<PromptGrants> {
        Err(not_supported(self.id(), "request_prompt"))
    }

    /// Leaves the controlling surface. Returns once the navigation was issued;
    /// the session resumes through `Orchestrator::resume`.
    fn navigate_to_settings(&self, _target: &SettingsTarget) -> GrantResult<()> {
        Err(not_supported(self.id(), "navigate_to_settings"))
    }

    fn is_granted(&self, capability: &Capability) -> bool {
        match capability {
            Capability::Prompt(prompt) => prompt
                .effective_permissions(self.api_level())
                .into_iter()
                .all(|permission| self.is_permission_granted(permission)),
            Capability::Settings(settings) => self.is_setting_enabled(settings.action),
        }
    }
}

pub type SharedEnvironment = Arc<dyn Environment>;

fn not_supported(platform: &str, action: &str) -> GrantError {
    GrantError::Environment(format!("{action} not supported on {platform}"))
}

pub mod scripted;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::manifest;

    struct ReadOnly;

    #[async_trait]
    impl Environment for ReadOnly {
        fn api_level(&self) -> u32 {
            30
        }

        fn is_permission_granted(&self, permission: &str) -> bool {
            permission == manifest::READ_EXTERNAL_STORAGE
        }

        fn is_setting_enabled(&self, _action: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn defaults_report_unsupported_actions() {
        let env = ReadOnly;
        let err = env
            .request_prompt(&[manifest::CAMERA.to_string()])
            .await
            .expect_err("unsupported");
        assert!(matches!(err, GrantError::Environment(ref message) if message.contains("request_prompt")));
        assert!(env
            .navigate_to_settings(&SettingsTarget::app_details(None))
            .is_err());
    }

    #[test]
    fn is_granted_uses_effective_permissions() {
        let env = ReadOnly;
        assert!(env.is_granted(&Capability::all_media_files()));
        assert!(env.is_granted(&Capability::post_notifications()));
        assert!(!env.is_granted(&Capability::camera()));
        assert!(!env.is_granted(&Capability::overlay_permission()));
    }
}
