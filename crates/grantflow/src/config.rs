use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bus::DEFAULT_BUS_CAPACITY;
use crate::error::ConfigError;
use crate::platform::SharedEnvironment;
use crate::session::config::{SessionConfigBuilder, Theme};
use crate::session::dispatcher::DEFAULT_SETTLED_HISTORY;
use crate::session::{Orchestrator, SessionConfig};
use crate::storage::{FileStorage, MemoryStorage, SharedStorage};
use crate::utils::time::now_secs;

pub const CONFIG_FILENAME: &str = "grantflow.json";
pub const CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantflowConfig {
    pub version: String,
    pub created_at: u64,
    pub default_theme: Theme,
    pub storage: StorageConfig,
    pub events: EventPreferences,
    pub dispatcher: DispatcherPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// JSON files under `dir`, resolved against the config directory when
    /// relative.
    File { dir: PathBuf },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPreferences {
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherPreferences {
    pub settled_history: usize,
}

impl GrantflowConfig {
    pub fn default_new() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            created_at: now_secs(),
            default_theme: Theme::default(),
            storage: StorageConfig::File {
                dir: PathBuf::from("state"),
            },
            events: EventPreferences {
                capacity: DEFAULT_BUS_CAPACITY,
            },
            dispatcher: DispatcherPreferences {
                settled_history: DEFAULT_SETTLED_HISTORY,
            },
        }
    }

    /// Session builder preloaded with the configured theme.
    pub fn session_builder(&self) -> SessionConfigBuilder {
        SessionConfig::builder().theme(self.default_theme)
    }

    pub fn build_storage(&self, base_dir: &Path) -> SharedStorage {
        match &self.storage {
            StorageConfig::File { dir } if dir.is_absolute() => {
                Arc::new(FileStorage::new(dir.clone()))
            }
            StorageConfig::File { dir } => Arc::new(FileStorage::new(base_dir.join(dir))),
            StorageConfig::Memory => Arc::new(MemoryStorage::new()),
        }
    }
}

impl Orchestrator {
    /// Builds an orchestrator from a loaded config; `base_dir` is the
    /// directory the config was loaded from.
    pub fn from_config(
        config: &GrantflowConfig,
        base_dir: &Path,
        env: SharedEnvironment,
    ) -> Self {
        Orchestrator::with_options(
            env,
            config.build_storage(base_dir),
            config.events.capacity,
            config.dispatcher.settled_history,
        )
    }
}

pub fn load_or_create_config(dir: &Path) -> Result<GrantflowConfig, ConfigError> {
    std::fs::create_dir_all(dir).map_err(|error| ConfigError::Io {
        path: dir.to_path_buf(),
        message: error.to_string(),
    })?;

    let path = config_path(dir);
    if !path.exists() {
        let config = GrantflowConfig::default_new();
        write_config(&path, &config)?;
        return Ok(config);
    }

    let data = std::fs::read_to_string(&path).map_err(|error| ConfigError::Io {
        path: path.clone(),
        message: error.to_string(),
    })?;
    let config: GrantflowConfig =
        serde_json::from_str(&data).map_err(|error| ConfigError::Parse {
            path: path.clone(),
            message: error.to_string(),
        })?;

    // Only one layout exists so far.
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Parse {
            path,
            message: format!("unsupported config version {}", config.version),
        });
    }

    Ok(config)
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

fn write_config(path: &Path, config: &GrantflowConfig) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(config).map_err(|error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    std::fs::write(path, data).map_err(|error| ConfigError::Io {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}
