//! Walks a session's work list one capability at a time.

use crate::bus::Bus;
use crate::capability::CapabilityId;
use crate::classifier::{classify, Classification};
use crate::error::GrantResult;
use crate::event::{CapabilityResolvedPayload, GrantEvent, SessionSuspendedPayload};
use crate::permissions::RationaleTracker;
use crate::platform::{Environment, SettingsTarget};
use crate::session::state::{GrantStatus, Group, SessionState, WorkItem};
use crate::storage::Storage;
use crate::utils::time::now_rfc3339;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Waiting on a settings surface; state has been persisted.
    Suspended {
        suspension: u32,
        capability: CapabilityId,
        target: SettingsTarget,
    },
    /// End of the work list, or a required denial.
    Finished,
}

pub struct Sequencer<'a> {
    env: &'a dyn Environment,
    storage: &'a dyn Storage,
    bus: &'a Bus,
}

impl<'a> Sequencer<'a> {
    pub fn new(env: &'a dyn Environment, storage: &'a dyn Storage, bus: &'a Bus) -> Self {
        Self { env, storage, bus }
    }

    /// Runs from the cursor until the session suspends or finishes.
    pub async fn drive(&self, state: &mut SessionState) -> GrantResult<Step> {
        let mut tracker = RationaleTracker::load(self.storage).await?;
        let step = self.walk(state, &mut tracker).await;
        tracker.save(self.storage).await?;
        step
    }

    /// Settles the entry that was waiting on a settings surface, then keeps
    /// walking. The entry is re-classified, never navigated to again.
    pub async fn resume(&self, state: &mut SessionState) -> GrantResult<Step> {
        let mut tracker = RationaleTracker::load(self.storage).await?;
        let step = self.resume_pending(state, &mut tracker).await;
        tracker.save(self.storage).await?;
        step
    }

    async fn resume_pending(
        &self,
        state: &mut SessionState,
        tracker: &mut RationaleTracker,
    ) -> GrantResult<Step> {
        state.wake();
        if let Some(item) = state.current() {
            if state.status(item.capability) == GrantStatus::PendingExternalReturn {
                let capability = item.build();
                let status =
                    match classify(&capability, self.env, state.package_name(), tracker) {
                        Classification::AlreadySatisfied => GrantStatus::Granted,
                        _ => GrantStatus::Denied,
                    };
                if !self.resolve(state, item, status)? {
                    return Ok(Step::Finished);
                }
            }
        }
        self.walk(state, tracker).await
    }

    async fn walk(
        &self,
        state: &mut SessionState,
        tracker: &mut RationaleTracker,
    ) -> GrantResult<Step> {
        while let Some(item) = state.current() {
            let capability = item.build();
            let status = match classify(&capability, self.env, state.package_name(), tracker) {
                Classification::AlreadySatisfied => GrantStatus::Granted,
                Classification::NeedsPrompt { permissions } => {
                    tracing::debug!(capability = %item.capability, ?permissions, "requesting prompt");
                    let grants = self.env.request_prompt(&permissions).await?;
                    tracing::debug!(capability = %item.capability, ?grants, "prompt answered");
                    if self.env.is_granted(&capability) {
                        GrantStatus::Granted
                    } else {
                        GrantStatus::Denied
                    }
                }
                Classification::NeedsSettingsNavigation(target) => {
                    state.record(item.capability, GrantStatus::PendingExternalReturn)?;
                    state.suspend(target.clone());
                    state.save(self.storage).await?;

                    match self.navigate(&target, state.package_name()) {
                        Ok(issued) => {
                            if issued != target {
                                state.suspend(issued.clone());
                                state.save(self.storage).await?;
                            }
                            tracing::info!(
                                session_id = %state.session_id(),
                                capability = %item.capability,
                                action = %issued.action,
                                "session suspended for settings navigation"
                            );
                            self.bus.emit(GrantEvent::SessionSuspended(SessionSuspendedPayload {
                                session_id: state.session_id().to_string(),
                                suspension: state.suspension(),
                                capability: item.capability,
                                target: issued.clone(),
                                at: now_rfc3339(),
                            }));
                            return Ok(Step::Suspended {
                                suspension: state.suspension(),
                                capability: item.capability,
                                target: issued,
                            });
                        }
                        Err(error) => {
                            tracing::warn!(
                                capability = %item.capability,
                                %error,
                                "settings surface unavailable"
                            );
                            state.wake();
                            GrantStatus::Denied
                        }
                    }
                }
            };
            if !self.resolve(state, item, status)? {
                return Ok(Step::Finished);
            }
        }
        Ok(Step::Finished)
    }

    /// Opens `target`, retrying once with its deep-link data toggled.
    fn navigate(
        &self,
        target: &SettingsTarget,
        package_name: Option<&str>,
    ) -> GrantResult<SettingsTarget> {
        match self.env.navigate_to_settings(target) {
            Ok(()) => Ok(target.clone()),
            Err(error) => {
                let Some(fallback) = target.with_toggled_data(package_name) else {
                    return Err(error);
                };
                tracing::debug!(%error, action = %target.action, "retrying navigation with toggled data");
                self.env.navigate_to_settings(&fallback)?;
                Ok(fallback)
            }
        }
    }

    /// Records a final status. Returns false when the session must stop.
    fn resolve(
        &self,
        state: &mut SessionState,
        item: WorkItem,
        status: GrantStatus,
    ) -> GrantResult<bool> {
        state.record(item.capability, status)?;
        tracing::info!(
            session_id = %state.session_id(),
            capability = %item.capability,
            group = ?item.group,
            status = ?status,
            "capability resolved"
        );
        self.bus.emit(GrantEvent::CapabilityResolved(CapabilityResolvedPayload {
            session_id: state.session_id().to_string(),
            capability: item.capability,
            group: item.group,
            status,
            at: now_rfc3339(),
        }));

        if status == GrantStatus::Denied && item.group == Group::Required {
            state.halt(item.capability);
            return Ok(false);
        }
        state.advance();
        Ok(true)
    }
}
