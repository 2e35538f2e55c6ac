//! Persistent record of permissions the platform has asked to explain.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{GrantError, GrantResult};
use crate::storage::{Storage, RATIONALE_KEY};

/// Platform permissions for which a rationale was shown at least once.
///
/// A permission that is neither granted nor currently asking for a rationale
/// is only permanently denied if it asked before; this set is what tells the
/// two cases apart, so it outlives individual sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationaleTracker {
    shown: BTreeSet<String>,
    #[serde(skip)]
    dirty: bool,
}

impl RationaleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(storage: &dyn Storage) -> GrantResult<Self> {
        match storage.read(&RATIONALE_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|error| GrantError::Storage(format!("rationale tracker parse error: {error}"))),
            None => Ok(Self::default()),
        }
    }

    /// Writes the tracker back if it changed since it was loaded.
    pub async fn save(&mut self, storage: &dyn Storage) -> GrantResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let value = serde_json::to_value(&*self)
            .map_err(|error| GrantError::Storage(format!("rationale tracker serialize error: {error}")))?;
        storage.write(&RATIONALE_KEY, &value).await?;
        self.dirty = false;
        Ok(())
    }

    pub fn mark_shown(&mut self, permission: &str) {
        if self.shown.insert(permission.to_string()) {
            self.dirty = true;
        }
    }

    pub fn was_shown(&self, permission: &str) -> bool {
        self.shown.contains(permission)
    }

    pub fn clear(&mut self, permission: &str) {
        if self.shown.remove(permission) {
            self.dirty = true;
        }
    }

    pub fn clear_all(&mut self) {
        if !self.shown.is_empty() {
            self.shown.clear();
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn mark_and_clear() {
        let mut tracker = RationaleTracker::new();
        tracker.mark_shown("android.permission.CAMERA");
        assert!(tracker.was_shown("android.permission.CAMERA"));
        assert!(tracker.is_dirty());

        tracker.clear("android.permission.CAMERA");
        assert!(!tracker.was_shown("android.permission.CAMERA"));

        tracker.mark_shown("a");
        tracker.mark_shown("b");
        tracker.clear_all();
        assert!(!tracker.was_shown("a"));
        assert!(!tracker.was_shown("b"));
    }

    #[tokio::test]
    async fn persists_through_storage() {
        let storage = MemoryStorage::new();
        let mut tracker = RationaleTracker::load(&storage).await.expect("load");
        assert!(!tracker.was_shown("android.permission.RECORD_AUDIO"));

        tracker.mark_shown("android.permission.RECORD_AUDIO");
        tracker.save(&storage).await.expect("save");
        assert!(!tracker.is_dirty());

        let reloaded = RationaleTracker::load(&storage).await.expect("reload");
        assert!(reloaded.was_shown("android.permission.RECORD_AUDIO"));
        assert!(!reloaded.is_dirty());
    }

    #[tokio::test]
    async fn clean_tracker_skips_write() {
        let storage = MemoryStorage::new();
        let mut tracker = RationaleTracker::new();
        tracker.save(&storage).await.expect("save");
        assert!(storage.is_empty());
    }
}
