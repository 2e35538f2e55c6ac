pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{GrantError, GrantResult};

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Namespace holding one entry per suspended session.
pub const SESSION_NAMESPACE: &str = "session";

/// Where the rationale tracker lives.
pub const RATIONALE_KEY: [&str; 2] = ["tracker", "rationale"];

pub fn session_key(session_id: &str) -> [&str; 2] {
    [SESSION_NAMESPACE, session_id]
}

/// Key-path addressed JSON storage for session state and the rationale
/// tracker.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn write(&self, keys: &[&str], data: &Value) -> GrantResult<()>;
    async fn read(&self, keys: &[&str]) -> GrantResult<Option<Value>>;
    /// Removes the entry. Returns `false` when nothing was stored.
    async fn delete(&self, keys: &[&str]) -> GrantResult<bool>;
    /// Entry names directly under `keys`, sorted.
    async fn list(&self, keys: &[&str]) -> GrantResult<Vec<String>>;
}

pub type SharedStorage = Arc<dyn Storage>;

/// Session ids end up as file names, so segments must be plain names.
pub(crate) fn validate_key(key: &str) -> GrantResult<()> {
    let plain = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.starts_with('.')
        && !key.contains(['/', '\\']);
    if plain {
        Ok(())
    } else {
        Err(GrantError::Storage(format!("invalid storage key {key:?}")))
    }
}
