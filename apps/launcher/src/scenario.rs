//! JSON description of a launch: what the app asks for, what the device
//! already allows, and how the user answers.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use grantflow::{Capability, ConfigError, GrantflowConfig, ScriptedEnvironment, SessionConfig, Theme};
use serde::Deserialize;

fn default_api_level() -> u32 {
    grantflow::platform::DEFAULT_API_LEVEL
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub app_name: String,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default = "default_api_level")]
    pub api_level: u32,
    #[serde(default)]
    pub launch_delay_ms: u64,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub device: DeviceState,
    /// Capability identifier to the user's answer when asked.
    #[serde(default)]
    pub answers: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceState {
    /// Capabilities already allowed before launch.
    #[serde(default)]
    pub granted: Vec<String>,
    /// Platform permission to the number of earlier refusals.
    #[serde(default)]
    pub previous_denials: BTreeMap<String, u32>,
    /// Platform permissions the user turns on from application details.
    #[serde(default)]
    pub app_details_grants: Vec<String>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn environment(&self) -> Result<ScriptedEnvironment, ConfigError> {
        let env = ScriptedEnvironment::new(self.api_level);
        for identifier in &self.device.granted {
            env.grant(&Capability::from_identifier(identifier)?);
        }
        for (permission, count) in &self.device.previous_denials {
            env.set_denials(permission, *count);
        }
        for permission in &self.device.app_details_grants {
            env.grant_on_app_details(permission);
        }
        for (identifier, granted) in &self.answers {
            env.answer(&Capability::from_identifier(identifier)?, *granted);
        }
        Ok(env)
    }

    pub fn session_config(&self, config: &GrantflowConfig) -> Result<SessionConfig, ConfigError> {
        let required: Vec<&str> = self.required.iter().map(String::as_str).collect();
        let optional: Vec<&str> = self.optional.iter().map(String::as_str).collect();

        let mut builder = config
            .session_builder()
            .app_name(&self.app_name)
            .required_identifiers(&required)
            .optional_identifiers(&optional);
        if let Some(theme) = self.theme {
            builder = builder.theme(theme);
        }
        if let Some(package_name) = &self.package_name {
            builder = builder.package_name(package_name);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantflow::{CapabilityId, Environment};
    use std::path::PathBuf;

    fn bundled(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("scenarios")
            .join(name)
    }

    #[test]
    fn bundled_scenario_builds_a_session() {
        let scenario = Scenario::load(&bundled("launch.json")).expect("scenario");
        let session = scenario
            .session_config(&GrantflowConfig::default_new())
            .expect("session");
        let required: Vec<CapabilityId> = session.required().iter().map(Capability::id).collect();
        assert_eq!(
            required,
            vec![
                CapabilityId::OverlayPermission,
                CapabilityId::IgnoreBatteryOptimizations,
                CapabilityId::CoarseLocation,
                CapabilityId::AllMediaFiles,
            ]
        );
        assert_eq!(session.theme(), Theme::DayNight);

        let env = scenario.environment().expect("environment");
        assert!(env.is_granted(&Capability::overlay_permission()));
        assert!(!env.is_granted(&Capability::coarse_location()));
    }

    #[test]
    fn unknown_identifier_is_a_config_error() {
        let scenario: Scenario = serde_json::from_value(serde_json::json!({
            "app_name": "Launcher",
            "required": ["teleport"]
        }))
        .expect("scenario");
        let err = scenario
            .session_config(&GrantflowConfig::default_new())
            .expect_err("unknown");
        assert_eq!(err, ConfigError::UnknownCapability("teleport".to_string()));
    }
}
