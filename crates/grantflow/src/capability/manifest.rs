//! Platform permission names, settings surfaces and API gating.

pub const CAMERA: &str = "android.permission.CAMERA";
pub const RECORD_AUDIO: &str = "android.permission.RECORD_AUDIO";
pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";
pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";
pub const ACCESS_BACKGROUND_LOCATION: &str = "android.permission.ACCESS_BACKGROUND_LOCATION";
pub const READ_MEDIA_IMAGES: &str = "android.permission.READ_MEDIA_IMAGES";
pub const READ_MEDIA_VIDEO: &str = "android.permission.READ_MEDIA_VIDEO";
pub const READ_MEDIA_AUDIO: &str = "android.permission.READ_MEDIA_AUDIO";
pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
pub const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";
pub const POST_NOTIFICATIONS: &str = "android.permission.POST_NOTIFICATIONS";
pub const READ_CONTACTS: &str = "android.permission.READ_CONTACTS";
pub const WRITE_CONTACTS: &str = "android.permission.WRITE_CONTACTS";
pub const READ_PHONE_STATE: &str = "android.permission.READ_PHONE_STATE";
pub const CALL_PHONE: &str = "android.permission.CALL_PHONE";
pub const READ_CALENDAR: &str = "android.permission.READ_CALENDAR";
pub const WRITE_CALENDAR: &str = "android.permission.WRITE_CALENDAR";

pub const ACTION_MANAGE_OVERLAY_PERMISSION: &str = "android.settings.action.MANAGE_OVERLAY_PERMISSION";
pub const ACTION_REQUEST_IGNORE_BATTERY_OPTIMIZATIONS: &str =
    "android.settings.REQUEST_IGNORE_BATTERY_OPTIMIZATIONS";
pub const ACTION_NOTIFICATION_LISTENER_SETTINGS: &str =
    "android.settings.ACTION_NOTIFICATION_LISTENER_SETTINGS";
pub const ACTION_ACCESSIBILITY_SETTINGS: &str = "android.settings.ACCESSIBILITY_SETTINGS";
pub const ACTION_USAGE_ACCESS_SETTINGS: &str = "android.settings.USAGE_ACCESS_SETTINGS";
pub const ACTION_MANAGE_WRITE_SETTINGS: &str = "android.settings.action.MANAGE_WRITE_SETTINGS";
pub const ACTION_NFC_SETTINGS: &str = "android.settings.NFC_SETTINGS";
pub const ACTION_APPLICATION_DETAILS_SETTINGS: &str =
    "android.settings.APPLICATION_DETAILS_SETTINGS";

/// Prefix shared by every settings action; identifiers carrying it always
/// name a settings capability.
pub const SETTINGS_ACTION_PREFIX: &str = "android.settings.";

pub const API_P: u32 = 28;
pub const API_Q: u32 = 29;
pub const API_S_V2: u32 = 32;
pub const API_TIRAMISU: u32 = 33;

/// One platform permission, optionally restricted to an API range
/// (both bounds inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifestPermission {
    pub name: &'static str,
    pub min_api: Option<u32>,
    pub max_api: Option<u32>,
}

impl ManifestPermission {
    pub const fn always(name: &'static str) -> Self {
        Self {
            name,
            min_api: None,
            max_api: None,
        }
    }

    pub const fn since(name: &'static str, api: u32) -> Self {
        Self {
            name,
            min_api: Some(api),
            max_api: None,
        }
    }

    pub const fn until(name: &'static str, api: u32) -> Self {
        Self {
            name,
            min_api: None,
            max_api: Some(api),
        }
    }

    pub fn is_active(&self, api_level: u32) -> bool {
        let above_min = self.min_api.map_or(true, |min| api_level >= min);
        let below_max = self.max_api.map_or(true, |max| api_level <= max);
        above_min && below_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gating_bounds_are_inclusive() {
        let since = ManifestPermission::since(POST_NOTIFICATIONS, API_TIRAMISU);
        assert!(!since.is_active(32));
        assert!(since.is_active(33));

        let until = ManifestPermission::until(READ_EXTERNAL_STORAGE, API_S_V2);
        assert!(until.is_active(32));
        assert!(!until.is_active(33));

        assert!(ManifestPermission::always(CAMERA).is_active(1));
    }
}
