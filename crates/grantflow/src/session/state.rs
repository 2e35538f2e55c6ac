use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::{Capability, CapabilityId};
use crate::error::{GrantError, GrantResult};
use crate::platform::SettingsTarget;
use crate::session::config::{SessionConfig, Theme};
use crate::storage::{session_key, Storage, SESSION_NAMESPACE};
use crate::utils::time::now_secs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Unknown,
    Granted,
    Denied,
    PendingExternalReturn,
}

impl GrantStatus {
    pub fn can_transition_to(self, next: GrantStatus) -> bool {
        matches!(
            (self, next),
            (
                GrantStatus::Unknown,
                GrantStatus::Granted | GrantStatus::Denied | GrantStatus::PendingExternalReturn
            ) | (
                GrantStatus::PendingExternalReturn,
                GrantStatus::Granted | GrantStatus::Denied
            )
        )
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, GrantStatus::Granted | GrantStatus::Denied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub capability: CapabilityId,
    pub group: Group,
}

impl WorkItem {
    pub fn build(&self) -> Capability {
        self.capability.capability()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Running,
    Suspended,
    Completed,
}

/// Per-session work list, cursor and status map. Persisted under
/// `session/<session_id>` while the session waits on a settings surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    session_id: String,
    theme: Theme,
    app_name: String,
    package_name: Option<String>,
    items: Vec<WorkItem>,
    cursor: usize,
    statuses: BTreeMap<CapabilityId, GrantStatus>,
    phase: Phase,
    pending_target: Option<SettingsTarget>,
    /// Bumped on every suspension; a resume must name the current value.
    #[serde(default)]
    suspension: u32,
    halted_on: Option<CapabilityId>,
    created_at: u64,
    updated_at: u64,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        let items: Vec<WorkItem> = config
            .required()
            .iter()
            .map(|capability| WorkItem {
                capability: capability.id(),
                group: Group::Required,
            })
            .chain(config.optional().iter().map(|capability| WorkItem {
                capability: capability.id(),
                group: Group::Optional,
            }))
            .collect();
        let statuses = items
            .iter()
            .map(|item| (item.capability, GrantStatus::Unknown))
            .collect();
        let now = now_secs();
        Self {
            session_id: Uuid::now_v7().to_string(),
            theme: config.theme(),
            app_name: config.app_name().to_string(),
            package_name: config.package_name().map(str::to_string),
            items,
            cursor: 0,
            statuses,
            phase: Phase::Running,
            pending_target: None,
            suspension: 0,
            halted_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_target(&self) -> Option<&SettingsTarget> {
        self.pending_target.as_ref()
    }

    pub fn suspension(&self) -> u32 {
        self.suspension
    }

    pub fn halted_on(&self) -> Option<CapabilityId> {
        self.halted_on
    }

    pub fn current(&self) -> Option<WorkItem> {
        self.items.get(self.cursor).copied()
    }

    pub fn status(&self, capability: CapabilityId) -> GrantStatus {
        self.statuses
            .get(&capability)
            .copied()
            .unwrap_or(GrantStatus::Unknown)
    }

    pub(crate) fn record(&mut self, capability: CapabilityId, next: GrantStatus) -> GrantResult<()> {
        let current = self.status(capability);
        if !current.can_transition_to(next) {
            return Err(GrantError::InvalidTransition {
                capability,
                from: current,
                to: next,
            });
        }
        self.statuses.insert(capability, next);
        self.touch();
        Ok(())
    }

    pub(crate) fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(self.items.len());
        self.touch();
    }

    /// Re-targeting an already suspended session keeps its suspension number.
    pub(crate) fn suspend(&mut self, target: SettingsTarget) {
        if self.phase != Phase::Suspended {
            self.suspension += 1;
        }
        self.phase = Phase::Suspended;
        self.pending_target = Some(target);
        self.touch();
    }

    pub(crate) fn wake(&mut self) {
        self.phase = Phase::Running;
        self.pending_target = None;
        self.touch();
    }

    pub(crate) fn halt(&mut self, capability: CapabilityId) {
        self.halted_on = Some(capability);
        self.touch();
    }

    pub(crate) fn complete(&mut self) {
        self.phase = Phase::Completed;
        self.pending_target = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = now_secs();
    }

    pub fn snapshot(&self) -> GrantSnapshot {
        GrantSnapshot {
            session_id: self.session_id.clone(),
            phase: self.phase,
            suspension: self.suspension,
            cursor: self.cursor,
            halted_on: self.halted_on,
            entries: self
                .items
                .iter()
                .map(|item| SnapshotEntry {
                    capability: item.capability,
                    group: item.group,
                    status: self.status(item.capability),
                })
                .collect(),
        }
    }

    pub async fn load(storage: &dyn Storage, session_id: &str) -> GrantResult<Option<Self>> {
        let Some(value) = storage.read(&session_key(session_id)).await? else {
            return Ok(None);
        };
        let state = serde_json::from_value(value).map_err(|error| {
            GrantError::Storage(format!("failed to parse session {session_id}: {error}"))
        })?;
        Ok(Some(state))
    }

    pub async fn save(&self, storage: &dyn Storage) -> GrantResult<()> {
        let value = serde_json::to_value(self).map_err(|error| {
            GrantError::Storage(format!(
                "failed to serialize session {}: {error}",
                self.session_id
            ))
        })?;
        storage.write(&session_key(&self.session_id), &value).await
    }

    pub async fn delete(storage: &dyn Storage, session_id: &str) -> GrantResult<bool> {
        storage.delete(&session_key(session_id)).await
    }

    /// Ids of every session persisted in `storage`.
    pub async fn stored_ids(storage: &dyn Storage) -> GrantResult<Vec<String>> {
        storage.list(&[SESSION_NAMESPACE]).await
    }
}

/// Read-only view of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    pub session_id: String,
    pub phase: Phase,
    pub suspension: u32,
    pub cursor: usize,
    pub halted_on: Option<CapabilityId>,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub capability: CapabilityId,
    pub group: Group,
    pub status: GrantStatus,
}

impl GrantSnapshot {
    pub fn status(&self, capability: CapabilityId) -> Option<GrantStatus> {
        self.entries
            .iter()
            .find(|entry| entry.capability == capability)
            .map(|entry| entry.status)
    }
}
