use std::path::PathBuf;

use crate::capability::CapabilityId;
use crate::session::GrantStatus;

/// Faults detected while assembling a session configuration or loading the
/// orchestrator config file. Always raised before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("app name is not set; call `app_name()` before `build()`")]
    MissingAppName,

    #[error("unknown capability identifier: {0}")]
    UnknownCapability(String),

    #[error("settings capability {0} must be added on its own")]
    SettingsGroup(String),

    #[error("capability {0} is declared more than once in the same group")]
    DuplicateCapability(CapabilityId),

    #[error("capability {0} is declared as both required and optional")]
    OverlappingGroups(CapabilityId),

    #[error("capability {capability} needs deep-link resource `{resource}` but none was configured")]
    MissingDeepLink {
        capability: CapabilityId,
        resource: &'static str,
    },

    #[error("failed to access config {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Unified error type for the grantflow crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("environment error: {0}")]
    Environment(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("invalid status transition for {capability}: {from:?} -> {to:?}")]
    InvalidTransition {
        capability: CapabilityId,
        from: GrantStatus,
        to: GrantStatus,
    },
}

/// Result type alias using [`GrantError`].
pub type GrantResult<T> = Result<T, GrantError>;
