//! In-memory storage, used by tests and by orchestrators configured without a
//! storage directory.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{GrantError, GrantResult};
use crate::storage::{validate_key, Storage};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<Vec<String>, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn owned_keys(keys: &[&str]) -> GrantResult<Vec<String>> {
    if keys.is_empty() {
        return Err(GrantError::Storage("storage keys empty".to_string()));
    }
    keys.iter()
        .map(|key| validate_key(key).map(|_| key.to_string()))
        .collect()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> GrantResult<()> {
        let keys = owned_keys(keys)?;
        self.entries.lock().insert(keys, data.clone());
        Ok(())
    }

    async fn read(&self, keys: &[&str]) -> GrantResult<Option<Value>> {
        let keys = owned_keys(keys)?;
        Ok(self.entries.lock().get(&keys).cloned())
    }

    async fn delete(&self, keys: &[&str]) -> GrantResult<bool> {
        let keys = owned_keys(keys)?;
        Ok(self.entries.lock().remove(&keys).is_some())
    }

    async fn list(&self, keys: &[&str]) -> GrantResult<Vec<String>> {
        let prefix: Vec<String> = keys
            .iter()
            .map(|key| validate_key(key).map(|_| key.to_string()))
            .collect::<GrantResult<_>>()?;
        let entries = self.entries.lock();
        let names: Vec<String> = entries
            .keys()
            .filter(|path| path.len() == prefix.len() + 1 && path.starts_with(&prefix))
            .filter_map(|path| path.last().cloned())
            .collect();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{session_key, RATIONALE_KEY, SESSION_NAMESPACE};
    use serde_json::json;

    #[tokio::test]
    async fn set_get_delete() {
        let storage = MemoryStorage::new();
        storage.write(&session_key("s1"), &json!({"cursor": 0})).await.expect("write");
        assert_eq!(
            storage.read(&session_key("s1")).await.expect("read"),
            Some(json!({"cursor": 0}))
        );
        assert!(storage.delete(&session_key("s1")).await.expect("delete"));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn list_only_direct_children() {
        let storage = MemoryStorage::new();
        storage.write(&session_key("b"), &json!(1)).await.expect("write");
        storage.write(&session_key("a"), &json!(2)).await.expect("write");
        storage.write(&RATIONALE_KEY, &json!([])).await.expect("write");

        assert_eq!(storage.list(&[SESSION_NAMESPACE]).await.expect("list"), vec!["a", "b"]);
        assert_eq!(storage.len(), 3);
    }
}
