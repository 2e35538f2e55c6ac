pub mod bus;
pub mod capability;
pub mod classifier;
pub mod config;
pub mod error;
pub mod event;
pub mod permissions;
pub mod platform;
pub mod session;
pub mod storage;
pub mod utils;

pub use bus::Bus;
pub use capability::{Capability, CapabilityId, Family};
pub use config::{load_or_create_config, GrantflowConfig};
pub use error::{ConfigError, GrantError, GrantResult};
pub use event::GrantEvent;
pub use platform::{Environment, ScriptedEnvironment, SettingsTarget, SharedEnvironment};
pub use session::{
    Callback, Denial, FnCallback, Orchestrator, Outcome, SessionConfig, SessionReport,
    SessionStatus, SharedCallback, Theme,
};
pub use storage::{FileStorage, MemoryStorage, SharedStorage, Storage};
