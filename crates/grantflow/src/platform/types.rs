use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::manifest::ACTION_APPLICATION_DETAILS_SETTINGS;
use crate::capability::DeepLinkResource;

/// Per-permission outcome of one prompt, keyed by platform permission name.
pub type PromptGrants = BTreeMap<String, bool>;

/// Where a settings navigation sends the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsTarget {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl SettingsTarget {
    /// The application-details surface, used for prompt capabilities that can
    /// no longer be prompted.
    pub fn app_details(package_name: Option<&str>) -> Self {
        Self {
            action: ACTION_APPLICATION_DETAILS_SETTINGS.to_string(),
            data: package_name.map(|package| DeepLinkResource::PackageUri.resolve(package)),
        }
    }

    /// Same surface with the deep-link data dropped if present, or added if
    /// absent and a package name is known.
    pub fn with_toggled_data(&self, package_name: Option<&str>) -> Option<Self> {
        let data = match &self.data {
            Some(_) => None,
            None => Some(DeepLinkResource::PackageUri.resolve(package_name?)),
        };
        Some(Self {
            action: self.action.clone(),
            data,
        })
    }
}

/// A user-visible interaction issued against the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    Prompt { permissions: Vec<String> },
    Navigate { target: SettingsTarget },
}
