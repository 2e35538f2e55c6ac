//! Constructors for every catalog entry.

use super::manifest::{self, ManifestPermission};
use super::{Capability, CapabilityId, DeepLinkResource, PromptCapability, SettingsCapability};

fn prompt(
    id: CapabilityId,
    rationale_key: &'static str,
    permissions: &[ManifestPermission],
) -> Capability {
    Capability::Prompt(PromptCapability {
        id,
        rationale_key,
        permissions: permissions.to_vec(),
    })
}

fn settings(
    id: CapabilityId,
    rationale_key: &'static str,
    action: &'static str,
    deep_link: Option<DeepLinkResource>,
) -> Capability {
    Capability::Settings(SettingsCapability {
        id,
        rationale_key,
        action,
        deep_link,
    })
}

const MEDIA_IMAGES: ManifestPermission =
    ManifestPermission::since(manifest::READ_MEDIA_IMAGES, manifest::API_TIRAMISU);
const MEDIA_VIDEO: ManifestPermission =
    ManifestPermission::since(manifest::READ_MEDIA_VIDEO, manifest::API_TIRAMISU);
const MEDIA_AUDIO: ManifestPermission =
    ManifestPermission::since(manifest::READ_MEDIA_AUDIO, manifest::API_TIRAMISU);
const LEGACY_READ: ManifestPermission =
    ManifestPermission::until(manifest::READ_EXTERNAL_STORAGE, manifest::API_S_V2);

impl Capability {
    pub fn camera() -> Self {
        prompt(
            CapabilityId::Camera,
            "rationale.camera",
            &[ManifestPermission::always(manifest::CAMERA)],
        )
    }

    pub fn record_audio() -> Self {
        prompt(
            CapabilityId::RecordAudio,
            "rationale.record_audio",
            &[ManifestPermission::always(manifest::RECORD_AUDIO)],
        )
    }

    pub fn fine_location() -> Self {
        prompt(
            CapabilityId::FineLocation,
            "rationale.fine_location",
            &[ManifestPermission::always(manifest::ACCESS_FINE_LOCATION)],
        )
    }

    pub fn coarse_location() -> Self {
        prompt(
            CapabilityId::CoarseLocation,
            "rationale.coarse_location",
            &[ManifestPermission::always(manifest::ACCESS_COARSE_LOCATION)],
        )
    }

    pub fn fine_and_coarse_location() -> Self {
        prompt(
            CapabilityId::FineAndCoarseLocation,
            "rationale.location",
            &[
                ManifestPermission::always(manifest::ACCESS_FINE_LOCATION),
                ManifestPermission::always(manifest::ACCESS_COARSE_LOCATION),
            ],
        )
    }

    /// Only meaningful from API 29; trivially satisfied below.
    pub fn background_location() -> Self {
        prompt(
            CapabilityId::BackgroundLocation,
            "rationale.background_location",
            &[ManifestPermission::since(
                manifest::ACCESS_BACKGROUND_LOCATION,
                manifest::API_Q,
            )],
        )
    }

    pub fn read_media_visual() -> Self {
        prompt(
            CapabilityId::ReadMediaVisual,
            "rationale.read_media_visual",
            &[MEDIA_IMAGES, MEDIA_VIDEO, LEGACY_READ],
        )
    }

    pub fn read_media_audio() -> Self {
        prompt(
            CapabilityId::ReadMediaAudio,
            "rationale.read_media_audio",
            &[MEDIA_AUDIO, LEGACY_READ],
        )
    }

    /// Granular media permissions from API 33, legacy external storage read
    /// before that.
    pub fn all_media_files() -> Self {
        prompt(
            CapabilityId::AllMediaFiles,
            "rationale.all_media_files",
            &[MEDIA_IMAGES, MEDIA_VIDEO, MEDIA_AUDIO, LEGACY_READ],
        )
    }

    pub fn read_external_storage() -> Self {
        prompt(
            CapabilityId::ReadExternalStorage,
            "rationale.read_external_storage",
            &[LEGACY_READ],
        )
    }

    pub fn write_external_storage() -> Self {
        prompt(
            CapabilityId::WriteExternalStorage,
            "rationale.write_external_storage",
            &[ManifestPermission::until(
                manifest::WRITE_EXTERNAL_STORAGE,
                manifest::API_P,
            )],
        )
    }

    pub fn post_notifications() -> Self {
        prompt(
            CapabilityId::PostNotifications,
            "rationale.post_notifications",
            &[ManifestPermission::since(
                manifest::POST_NOTIFICATIONS,
                manifest::API_TIRAMISU,
            )],
        )
    }

    pub fn read_contacts() -> Self {
        prompt(
            CapabilityId::ReadContacts,
            "rationale.read_contacts",
            &[ManifestPermission::always(manifest::READ_CONTACTS)],
        )
    }

    pub fn write_contacts() -> Self {
        prompt(
            CapabilityId::WriteContacts,
            "rationale.write_contacts",
            &[ManifestPermission::always(manifest::WRITE_CONTACTS)],
        )
    }

    pub fn read_write_contacts() -> Self {
        prompt(
            CapabilityId::ReadWriteContacts,
            "rationale.contacts",
            &[
                ManifestPermission::always(manifest::READ_CONTACTS),
                ManifestPermission::always(manifest::WRITE_CONTACTS),
            ],
        )
    }

    pub fn read_phone_state() -> Self {
        prompt(
            CapabilityId::ReadPhoneState,
            "rationale.read_phone_state",
            &[ManifestPermission::always(manifest::READ_PHONE_STATE)],
        )
    }

    pub fn call_phone() -> Self {
        prompt(
            CapabilityId::CallPhone,
            "rationale.call_phone",
            &[ManifestPermission::always(manifest::CALL_PHONE)],
        )
    }

    pub fn read_calendar() -> Self {
        prompt(
            CapabilityId::ReadCalendar,
            "rationale.read_calendar",
            &[ManifestPermission::always(manifest::READ_CALENDAR)],
        )
    }

    pub fn write_calendar() -> Self {
        prompt(
            CapabilityId::WriteCalendar,
            "rationale.write_calendar",
            &[ManifestPermission::always(manifest::WRITE_CALENDAR)],
        )
    }

    pub fn read_write_calendar() -> Self {
        prompt(
            CapabilityId::ReadWriteCalendar,
            "rationale.calendar",
            &[
                ManifestPermission::always(manifest::READ_CALENDAR),
                ManifestPermission::always(manifest::WRITE_CALENDAR),
            ],
        )
    }

    pub fn overlay_permission() -> Self {
        settings(
            CapabilityId::OverlayPermission,
            "rationale.overlay",
            manifest::ACTION_MANAGE_OVERLAY_PERMISSION,
            Some(DeepLinkResource::PackageUri),
        )
    }

    pub fn ignore_battery_optimizations() -> Self {
        settings(
            CapabilityId::IgnoreBatteryOptimizations,
            "rationale.ignore_battery_optimizations",
            manifest::ACTION_REQUEST_IGNORE_BATTERY_OPTIMIZATIONS,
            Some(DeepLinkResource::PackageUri),
        )
    }

    pub fn notification_listener() -> Self {
        settings(
            CapabilityId::NotificationListener,
            "rationale.notification_listener",
            manifest::ACTION_NOTIFICATION_LISTENER_SETTINGS,
            None,
        )
    }

    pub fn accessibility() -> Self {
        settings(
            CapabilityId::Accessibility,
            "rationale.accessibility",
            manifest::ACTION_ACCESSIBILITY_SETTINGS,
            None,
        )
    }

    pub fn usage_access() -> Self {
        settings(
            CapabilityId::UsageAccess,
            "rationale.usage_access",
            manifest::ACTION_USAGE_ACCESS_SETTINGS,
            None,
        )
    }

    pub fn write_settings() -> Self {
        settings(
            CapabilityId::WriteSettings,
            "rationale.write_settings",
            manifest::ACTION_MANAGE_WRITE_SETTINGS,
            None,
        )
    }

    pub fn nfc_settings() -> Self {
        settings(
            CapabilityId::NfcSettings,
            "rationale.nfc",
            manifest::ACTION_NFC_SETTINGS,
            None,
        )
    }
}

pub fn build(id: CapabilityId) -> Capability {
    match id {
        CapabilityId::Camera => Capability::camera(),
        CapabilityId::RecordAudio => Capability::record_audio(),
        CapabilityId::FineLocation => Capability::fine_location(),
        CapabilityId::CoarseLocation => Capability::coarse_location(),
        CapabilityId::FineAndCoarseLocation => Capability::fine_and_coarse_location(),
        CapabilityId::BackgroundLocation => Capability::background_location(),
        CapabilityId::ReadMediaVisual => Capability::read_media_visual(),
        CapabilityId::ReadMediaAudio => Capability::read_media_audio(),
        CapabilityId::AllMediaFiles => Capability::all_media_files(),
        CapabilityId::ReadExternalStorage => Capability::read_external_storage(),
        CapabilityId::WriteExternalStorage => Capability::write_external_storage(),
        CapabilityId::PostNotifications => Capability::post_notifications(),
        CapabilityId::ReadContacts => Capability::read_contacts(),
        CapabilityId::WriteContacts => Capability::write_contacts(),
        CapabilityId::ReadWriteContacts => Capability::read_write_contacts(),
        CapabilityId::ReadPhoneState => Capability::read_phone_state(),
        CapabilityId::CallPhone => Capability::call_phone(),
        CapabilityId::ReadCalendar => Capability::read_calendar(),
        CapabilityId::WriteCalendar => Capability::write_calendar(),
        CapabilityId::ReadWriteCalendar => Capability::read_write_calendar(),
        CapabilityId::OverlayPermission => Capability::overlay_permission(),
        CapabilityId::IgnoreBatteryOptimizations => Capability::ignore_battery_optimizations(),
        CapabilityId::NotificationListener => Capability::notification_listener(),
        CapabilityId::Accessibility => Capability::accessibility(),
        CapabilityId::UsageAccess => Capability::usage_access(),
        CapabilityId::WriteSettings => Capability::write_settings(),
        CapabilityId::NfcSettings => Capability::nfc_settings(),
    }
}

/// Every catalog entry, in `CapabilityId::ALL` order.
pub fn all() -> Vec<Capability> {
    CapabilityId::ALL.into_iter().map(build).collect()
}
