//! Directory-backed storage. A suspended session has to outlive the process
//! that started it, so every entry is a JSON file that is replaced in one
//! rename: a reader sees the previous state or the new one, never a torn
//! write.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GrantError, GrantResult};
use crate::storage::{validate_key, Storage};

const EXTENSION: &str = "json";
const STAGING_EXTENSION: &str = "json.partial";

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, namespace: &[&str]) -> GrantResult<PathBuf> {
        namespace.iter().try_fold(self.root.clone(), |dir, key| {
            validate_key(key)?;
            Ok(dir.join(key))
        })
    }

    fn entry_path(&self, keys: &[&str]) -> GrantResult<PathBuf> {
        let Some((name, namespace)) = keys.split_last() else {
            return Err(GrantError::Storage("storage keys empty".to_string()));
        };
        validate_key(name)?;
        Ok(self.dir_for(namespace)?.join(format!("{name}.{EXTENSION}")))
    }
}

fn io_error(action: &str, path: &Path, error: std::io::Error) -> GrantError {
    GrantError::Storage(format!("failed to {action} {}: {error}", path.display()))
}

#[async_trait]
impl Storage for FileStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> GrantResult<()> {
        let path = self.entry_path(keys)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|error| io_error("create", dir, error))?;
        }
        let bytes = serde_json::to_vec_pretty(data)
            .map_err(|error| GrantError::Storage(format!("failed to encode {}: {error}", path.display())))?;

        let staging = path.with_extension(STAGING_EXTENSION);
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|error| io_error("write", &staging, error))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|error| io_error("replace", &path, error))
    }

    async fn read(&self, keys: &[&str]) -> GrantResult<Option<Value>> {
        let path = self.entry_path(keys)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_error("read", &path, error)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|error| GrantError::Storage(format!("failed to decode {}: {error}", path.display())))
    }

    async fn delete(&self, keys: &[&str]) -> GrantResult<bool> {
        let path = self.entry_path(keys)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(io_error("delete", &path, error)),
        }
    }

    /// Committed entries only; staging files from an interrupted write are
    /// skipped.
    async fn list(&self, keys: &[&str]) -> GrantResult<Vec<String>> {
        let dir = self.dir_for(keys)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(io_error("list", &dir, error)),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|error| io_error("list", &dir, error))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
            else {
                continue;
            };
            if validate_key(name).is_ok() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{session_key, RATIONALE_KEY, SESSION_NAMESPACE};
    use tempfile::tempdir;

    #[tokio::test]
    async fn session_entries_are_json_files() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let value = serde_json::json!({ "cursor": 2 });
        storage.write(&session_key("abc"), &value).await.expect("write");

        assert!(dir.path().join("session/abc.json").exists());
        assert!(!dir.path().join("session/abc.json.partial").exists());
        let loaded = storage
            .read(&session_key("abc"))
            .await
            .expect("read")
            .expect("value");
        assert_eq!(value, loaded);
    }

    #[tokio::test]
    async fn rewrite_replaces_previous_state() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        storage
            .write(&RATIONALE_KEY, &serde_json::json!({ "shown": [] }))
            .await
            .expect("first");
        storage
            .write(&RATIONALE_KEY, &serde_json::json!({ "shown": ["camera"] }))
            .await
            .expect("second");
        assert_eq!(
            storage.read(&RATIONALE_KEY).await.expect("read"),
            Some(serde_json::json!({ "shown": ["camera"] }))
        );
        assert!(storage.read(&session_key("missing")).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn listing_skips_interrupted_writes() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let value = serde_json::json!(true);
        storage.write(&session_key("b"), &value).await.expect("write");
        storage.write(&session_key("a"), &value).await.expect("write");
        std::fs::write(dir.path().join("session/c.json.partial"), b"{").expect("partial");

        assert_eq!(
            storage.list(&[SESSION_NAMESPACE]).await.expect("list"),
            vec!["a", "b"]
        );
        assert!(storage.delete(&session_key("a")).await.expect("delete"));
        assert!(!storage.delete(&session_key("a")).await.expect("delete"));
        assert_eq!(storage.list(&[SESSION_NAMESPACE]).await.expect("list"), vec!["b"]);
        assert!(storage.list(&["nothing"]).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let err = storage
            .write(&session_key(".."), &serde_json::json!({}))
            .await
            .expect_err("invalid key");
        assert!(matches!(err, GrantError::Storage(_)));
    }
}
