use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityId};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Day,
    Night,
    #[default]
    DayNight,
}

/// Validated, immutable input of one check-and-show session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    theme: Theme,
    app_name: String,
    package_name: Option<String>,
    required: Vec<Capability>,
    optional: Vec<Capability>,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn required(&self) -> &[Capability] {
        &self.required
    }

    pub fn optional(&self) -> &[Capability] {
        &self.optional
    }
}

/// Chained assembly of a [`SessionConfig`]. Identifier errors are held back
/// and reported by [`SessionConfigBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    theme: Theme,
    app_name: Option<String>,
    package_name: Option<String>,
    required: Vec<Capability>,
    optional: Vec<Capability>,
    deferred: Option<ConfigError>,
}

impl SessionConfigBuilder {
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Package used to resolve `package:` deep links. Required for settings
    /// capabilities that declare one. Without it, a permanently denied
    /// prompt capability opens the application-details surface with no
    /// data; if the environment cannot open that, the capability is Denied.
    pub fn package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn required(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.required.extend(capabilities);
        self
    }

    pub fn optional(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.optional.extend(capabilities);
        self
    }

    /// Appends required capabilities by identifier, one capability each.
    pub fn required_identifiers(mut self, identifiers: &[&str]) -> Self {
        let resolved = self.resolve(identifiers);
        self.required.extend(resolved);
        self
    }

    pub fn optional_identifiers(mut self, identifiers: &[&str]) -> Self {
        let resolved = self.resolve(identifiers);
        self.optional.extend(resolved);
        self
    }

    fn resolve(&mut self, identifiers: &[&str]) -> Vec<Capability> {
        let mut resolved = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            match Capability::from_identifier(identifier) {
                Ok(capability) => resolved.push(capability),
                Err(error) => {
                    self.deferred.get_or_insert(error);
                }
            }
        }
        resolved
    }

    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        let app_name = self
            .app_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConfigError::MissingAppName)?;
        if let Some(error) = self.deferred {
            return Err(error);
        }

        unique_ids(&self.required)?;
        let optional_ids = unique_ids(&self.optional)?;
        if let Some(id) = self
            .required
            .iter()
            .map(Capability::id)
            .find(|id| optional_ids.contains(id))
        {
            return Err(ConfigError::OverlappingGroups(id));
        }

        if self.package_name.is_none() {
            for capability in self.required.iter().chain(&self.optional) {
                if let Capability::Settings(settings) = capability {
                    if let Some(resource) = settings.deep_link {
                        return Err(ConfigError::MissingDeepLink {
                            capability: settings.id,
                            resource: resource.as_str(),
                        });
                    }
                }
            }
        }

        Ok(SessionConfig {
            theme: self.theme,
            app_name,
            package_name: self.package_name,
            required: self.required,
            optional: self.optional,
        })
    }
}

fn unique_ids(capabilities: &[Capability]) -> Result<HashSet<CapabilityId>, ConfigError> {
    let mut seen = HashSet::with_capacity(capabilities.len());
    for capability in capabilities {
        if !seen.insert(capability.id()) {
            return Err(ConfigError::DuplicateCapability(capability.id()));
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let config = SessionConfig::builder()
            .app_name("Grantflow Demo")
            .required([Capability::camera()])
            .build()
            .expect("config");
        assert_eq!(config.theme(), Theme::DayNight);
        assert_eq!(config.app_name(), "Grantflow Demo");
        assert_eq!(config.required(), &[Capability::camera()]);
        assert!(config.optional().is_empty());
    }

    #[test]
    fn app_name_is_mandatory() {
        let err = SessionConfig::builder()
            .required([Capability::camera()])
            .build()
            .expect_err("missing app name");
        assert_eq!(err, ConfigError::MissingAppName);

        let err = SessionConfig::builder().app_name("  ").build().expect_err("blank");
        assert_eq!(err, ConfigError::MissingAppName);
    }

    #[test]
    fn rejects_duplicates_and_overlap() {
        let err = SessionConfig::builder()
            .app_name("demo")
            .required([Capability::camera(), Capability::camera()])
            .build()
            .expect_err("duplicate");
        assert_eq!(err, ConfigError::DuplicateCapability(CapabilityId::Camera));

        let err = SessionConfig::builder()
            .app_name("demo")
            .required([Capability::camera()])
            .optional([Capability::record_audio(), Capability::camera()])
            .build()
            .expect_err("overlap");
        assert_eq!(err, ConfigError::OverlappingGroups(CapabilityId::Camera));
    }

    #[test]
    fn package_uri_needs_package_name() {
        let err = SessionConfig::builder()
            .app_name("demo")
            .optional([Capability::ignore_battery_optimizations()])
            .build()
            .expect_err("missing deep link");
        assert_eq!(
            err,
            ConfigError::MissingDeepLink {
                capability: CapabilityId::IgnoreBatteryOptimizations,
                resource: "package-uri",
            }
        );

        SessionConfig::builder()
            .app_name("demo")
            .required([Capability::nfc_settings()])
            .build()
            .expect("nfc needs no deep link");
    }

    #[test]
    fn identifiers_resolve_or_fail_at_build() {
        let config = SessionConfig::builder()
            .app_name("demo")
            .package_name("com.example.app")
            .required_identifiers(&[
                "android.settings.action.MANAGE_OVERLAY_PERMISSION",
                "coarse-location",
            ])
            .optional_identifiers(&["android.permission.CAMERA"])
            .build()
            .expect("config");
        assert_eq!(
            config.required(),
            &[Capability::overlay_permission(), Capability::coarse_location()]
        );
        assert_eq!(config.optional(), &[Capability::camera()]);

        let err = SessionConfig::builder()
            .app_name("demo")
            .required_identifiers(&["camera", "not-a-capability"])
            .build()
            .expect_err("unknown");
        assert_eq!(
            err,
            ConfigError::UnknownCapability("not-a-capability".to_string())
        );
    }
}
