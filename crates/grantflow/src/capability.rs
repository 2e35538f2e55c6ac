pub mod catalog;
pub mod manifest;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::SettingsTarget;

pub use manifest::ManifestPermission;

/// Closed set of requestable capabilities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityId {
    Camera,
    RecordAudio,
    FineLocation,
    CoarseLocation,
    FineAndCoarseLocation,
    BackgroundLocation,
    ReadMediaVisual,
    ReadMediaAudio,
    AllMediaFiles,
    ReadExternalStorage,
    WriteExternalStorage,
    PostNotifications,
    ReadContacts,
    WriteContacts,
    ReadWriteContacts,
    ReadPhoneState,
    CallPhone,
    ReadCalendar,
    WriteCalendar,
    ReadWriteCalendar,
    OverlayPermission,
    IgnoreBatteryOptimizations,
    NotificationListener,
    Accessibility,
    UsageAccess,
    WriteSettings,
    NfcSettings,
}

impl CapabilityId {
    pub const ALL: [CapabilityId; 27] = [
        CapabilityId::Camera,
        CapabilityId::RecordAudio,
        CapabilityId::FineLocation,
        CapabilityId::CoarseLocation,
        CapabilityId::FineAndCoarseLocation,
        CapabilityId::BackgroundLocation,
        CapabilityId::ReadMediaVisual,
        CapabilityId::ReadMediaAudio,
        CapabilityId::AllMediaFiles,
        CapabilityId::ReadExternalStorage,
        CapabilityId::WriteExternalStorage,
        CapabilityId::PostNotifications,
        CapabilityId::ReadContacts,
        CapabilityId::WriteContacts,
        CapabilityId::ReadWriteContacts,
        CapabilityId::ReadPhoneState,
        CapabilityId::CallPhone,
        CapabilityId::ReadCalendar,
        CapabilityId::WriteCalendar,
        CapabilityId::ReadWriteCalendar,
        CapabilityId::OverlayPermission,
        CapabilityId::IgnoreBatteryOptimizations,
        CapabilityId::NotificationListener,
        CapabilityId::Accessibility,
        CapabilityId::UsageAccess,
        CapabilityId::WriteSettings,
        CapabilityId::NfcSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityId::Camera => "camera",
            CapabilityId::RecordAudio => "record-audio",
            CapabilityId::FineLocation => "fine-location",
            CapabilityId::CoarseLocation => "coarse-location",
            CapabilityId::FineAndCoarseLocation => "fine-and-coarse-location",
            CapabilityId::BackgroundLocation => "background-location",
            CapabilityId::ReadMediaVisual => "read-media-visual",
            CapabilityId::ReadMediaAudio => "read-media-audio",
            CapabilityId::AllMediaFiles => "all-media-files",
            CapabilityId::ReadExternalStorage => "read-external-storage",
            CapabilityId::WriteExternalStorage => "write-external-storage",
            CapabilityId::PostNotifications => "post-notifications",
            CapabilityId::ReadContacts => "read-contacts",
            CapabilityId::WriteContacts => "write-contacts",
            CapabilityId::ReadWriteContacts => "read-write-contacts",
            CapabilityId::ReadPhoneState => "read-phone-state",
            CapabilityId::CallPhone => "call-phone",
            CapabilityId::ReadCalendar => "read-calendar",
            CapabilityId::WriteCalendar => "write-calendar",
            CapabilityId::ReadWriteCalendar => "read-write-calendar",
            CapabilityId::OverlayPermission => "overlay-permission",
            CapabilityId::IgnoreBatteryOptimizations => "ignore-battery-optimizations",
            CapabilityId::NotificationListener => "notification-listener",
            CapabilityId::Accessibility => "accessibility",
            CapabilityId::UsageAccess => "usage-access",
            CapabilityId::WriteSettings => "write-settings",
            CapabilityId::NfcSettings => "nfc-settings",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            CapabilityId::OverlayPermission
            | CapabilityId::IgnoreBatteryOptimizations
            | CapabilityId::NotificationListener
            | CapabilityId::Accessibility
            | CapabilityId::UsageAccess
            | CapabilityId::WriteSettings
            | CapabilityId::NfcSettings => Family::Settings,
            _ => Family::Prompt,
        }
    }

    /// Builds the catalog entry for this identifier.
    pub fn capability(self) -> Capability {
        catalog::build(self)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityId {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CapabilityId::ALL
            .into_iter()
            .find(|id| id.as_str() == value)
            .ok_or_else(|| ConfigError::UnknownCapability(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Prompt,
    Settings,
}

/// Extra data a settings surface needs before it can be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeepLinkResource {
    /// `package:<package name>` data on the navigation.
    PackageUri,
}

impl DeepLinkResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeepLinkResource::PackageUri => "package-uri",
        }
    }

    pub fn resolve(&self, package_name: &str) -> String {
        match self {
            DeepLinkResource::PackageUri => format!("package:{package_name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCapability {
    pub id: CapabilityId,
    pub rationale_key: &'static str,
    pub permissions: Vec<ManifestPermission>,
}

impl PromptCapability {
    /// Platform permissions that apply on `api_level`, in declaration order.
    /// An empty result means the capability is trivially satisfied.
    pub fn effective_permissions(&self, api_level: u32) -> Vec<&'static str> {
        self.permissions
            .iter()
            .filter(|permission| permission.is_active(api_level))
            .map(|permission| permission.name)
            .collect()
    }

    fn declared_names(&self) -> BTreeSet<&'static str> {
        self.permissions.iter().map(|permission| permission.name).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsCapability {
    pub id: CapabilityId,
    pub rationale_key: &'static str,
    pub action: &'static str,
    pub deep_link: Option<DeepLinkResource>,
}

impl SettingsCapability {
    /// Navigation target for this surface. Deep-link data is attached only
    /// when the capability declares a resource and a package name is known.
    pub fn target(&self, package_name: Option<&str>) -> SettingsTarget {
        let data = match (self.deep_link, package_name) {
            (Some(resource), Some(package)) => Some(resource.resolve(package)),
            _ => None,
        };
        SettingsTarget {
            action: self.action.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Prompt(PromptCapability),
    Settings(SettingsCapability),
}

impl Capability {
    pub fn id(&self) -> CapabilityId {
        match self {
            Capability::Prompt(prompt) => prompt.id,
            Capability::Settings(settings) => settings.id,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Capability::Prompt(_) => Family::Prompt,
            Capability::Settings(_) => Family::Settings,
        }
    }

    pub fn rationale_key(&self) -> &'static str {
        match self {
            Capability::Prompt(prompt) => prompt.rationale_key,
            Capability::Settings(settings) => settings.rationale_key,
        }
    }

    /// Resolves one identifier: a catalog id (`coarse-location`), a settings
    /// action, or the platform permission of a single-permission capability.
    pub fn from_identifier(identifier: &str) -> Result<Self, ConfigError> {
        if let Ok(id) = identifier.parse::<CapabilityId>() {
            return Ok(id.capability());
        }
        Self::from_identifiers(&[identifier])
    }

    /// Resolves a set of platform permissions to the prompt capability that
    /// stands for exactly that set. A settings action must be passed alone.
    pub fn from_identifiers(identifiers: &[&str]) -> Result<Self, ConfigError> {
        let joined = identifiers.join(",");
        if identifiers.is_empty() {
            return Err(ConfigError::UnknownCapability(joined));
        }

        if identifiers
            .iter()
            .any(|identifier| identifier.starts_with(manifest::SETTINGS_ACTION_PREFIX))
        {
            if identifiers.len() > 1 {
                return Err(ConfigError::SettingsGroup(joined));
            }
            return catalog::all()
                .into_iter()
                .find(|capability| {
                    matches!(capability, Capability::Settings(settings) if settings.action == identifiers[0])
                })
                .ok_or(ConfigError::UnknownCapability(joined));
        }

        let wanted: BTreeSet<&str> = identifiers.iter().copied().collect();
        catalog::all()
            .into_iter()
            .find(|capability| match capability {
                Capability::Prompt(prompt) => prompt.declared_names() == wanted,
                Capability::Settings(_) => false,
            })
            .ok_or(ConfigError::UnknownCapability(joined))
    }
}
