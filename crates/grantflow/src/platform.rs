mod adapters;
pub mod types;

pub use adapters::scripted::{ScriptedEnvironment, DEFAULT_API_LEVEL};
pub use adapters::{Environment, SharedEnvironment};
pub use types::{Interaction, PromptGrants, SettingsTarget};
