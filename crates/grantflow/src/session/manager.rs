use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bus::{Bus, DEFAULT_BUS_CAPACITY};
use crate::capability::{Capability, CapabilityId};
use crate::error::{GrantError, GrantResult};
use crate::event::{
    AbandonReason, GrantEvent, SessionAbandonedPayload, SessionCompletedPayload,
    SessionResumedPayload, SessionStartedPayload,
};
use crate::platform::{SettingsTarget, SharedEnvironment};
use crate::session::aggregator::{aggregate, SessionReport};
use crate::session::config::SessionConfig;
use crate::session::dispatcher::{
    notify, CallbackDispatcher, SharedCallback, DEFAULT_SETTLED_HISTORY,
};
use crate::session::sequencer::{Sequencer, Step};
use crate::session::state::{GrantSnapshot, Phase, SessionState};
use crate::storage::SharedStorage;
use crate::utils::time::now_rfc3339;

/// Where a session stands after a call into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for the user to come back from a settings surface. Pass
    /// `suspension` back to [`Orchestrator::resume`].
    Suspended {
        session_id: String,
        suspension: u32,
        capability: CapabilityId,
        target: SettingsTarget,
    },
    Completed {
        session_id: String,
        report: SessionReport,
    },
    /// The session already settled or was abandoned; nothing happened.
    Stale { session_id: String },
}

impl SessionStatus {
    pub fn session_id(&self) -> &str {
        match self {
            SessionStatus::Suspended { session_id, .. }
            | SessionStatus::Completed { session_id, .. }
            | SessionStatus::Stale { session_id } => session_id,
        }
    }

    pub fn suspension(&self) -> Option<u32> {
        match self {
            SessionStatus::Suspended { suspension, .. } => Some(*suspension),
            _ => None,
        }
    }
}

/// Long-lived owner of sessions. Serialises check-and-show, resume and
/// teardown so at most one sequencer runs at a time.
pub struct Orchestrator {
    env: SharedEnvironment,
    storage: SharedStorage,
    bus: Bus,
    dispatcher: Mutex<CallbackDispatcher>,
    active: tokio::sync::Mutex<Option<String>>,
}

impl Orchestrator {
    pub fn new(env: SharedEnvironment, storage: SharedStorage) -> Self {
        Self::with_options(env, storage, DEFAULT_BUS_CAPACITY, DEFAULT_SETTLED_HISTORY)
    }

    pub fn with_options(
        env: SharedEnvironment,
        storage: SharedStorage,
        bus_capacity: usize,
        settled_history: usize,
    ) -> Self {
        Self {
            env,
            storage,
            bus: Bus::new(bus_capacity),
            dispatcher: Mutex::new(CallbackDispatcher::new(settled_history)),
            active: tokio::sync::Mutex::new(None),
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn environment(&self) -> &SharedEnvironment {
        &self.env
    }

    /// Id of the session currently waiting on a settings surface, if any.
    pub async fn active_session(&self) -> Option<String> {
        self.active.lock().await.clone()
    }

    /// Starts a session. A session still pending from an earlier call is
    /// abandoned first and its callback never fires.
    #[tracing::instrument(skip_all, fields(app_name = %config.app_name()))]
    pub async fn check_and_show(
        &self,
        config: SessionConfig,
        callback: SharedCallback,
    ) -> GrantResult<SessionStatus> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            tracing::info!(session_id = %previous, "superseding pending session");
            self.abandon(&previous, AbandonReason::Superseded).await?;
        }

        let mut state = SessionState::new(&config);
        let session_id = state.session_id().to_string();
        tracing::info!(
            session_id = %session_id,
            required = config.required().len(),
            optional = config.optional().len(),
            "session started"
        );
        self.bus.emit(GrantEvent::SessionStarted(SessionStartedPayload {
            session_id: session_id.clone(),
            app_name: config.app_name().to_string(),
            theme: config.theme(),
            required: config.required().iter().map(Capability::id).collect(),
            optional: config.optional().iter().map(Capability::id).collect(),
            at: now_rfc3339(),
        }));
        self.dispatcher.lock().register(&session_id, callback);

        let step = Sequencer::new(self.env.as_ref(), self.storage.as_ref(), &self.bus)
            .drive(&mut state)
            .await;
        self.settle(&mut active, state, step).await
    }

    /// Entry point for the lifecycle glue once the controlling surface is
    /// back in front after a settings navigation. `suspension` is the number
    /// handed out with [`SessionStatus::Suspended`]; a signal naming an
    /// earlier suspension, or a settled session, returns
    /// [`SessionStatus::Stale`].
    #[tracing::instrument(skip(self))]
    pub async fn resume(&self, session_id: &str, suspension: u32) -> GrantResult<SessionStatus> {
        let mut active = self.active.lock().await;
        let stored = SessionState::load(self.storage.as_ref(), session_id).await?;
        let mut state = match stored {
            Some(state) if state.phase() == Phase::Suspended => state,
            Some(_) => return Ok(self.stale(session_id)),
            None if self.dispatcher.lock().is_settled(session_id) => {
                return Ok(self.stale(session_id))
            }
            None => return Err(GrantError::SessionNotFound(session_id.to_string())),
        };
        if self.dispatcher.lock().is_settled(session_id) {
            return Ok(self.stale(session_id));
        }
        if state.suspension() != suspension {
            tracing::info!(
                session_id,
                current = state.suspension(),
                "ignoring resume for an earlier suspension"
            );
            return Ok(SessionStatus::Stale {
                session_id: session_id.to_string(),
            });
        }
        if let Some(previous) = active.take().filter(|previous| previous != session_id) {
            tracing::info!(session_id = %previous, "superseding pending session");
            self.abandon(&previous, AbandonReason::Superseded).await?;
        }

        tracing::info!(session_id, "session resumed");
        self.bus.emit(GrantEvent::SessionResumed(SessionResumedPayload {
            session_id: session_id.to_string(),
            suspension,
            capability: state.current().map(|item| item.capability),
            at: now_rfc3339(),
        }));

        let step = Sequencer::new(self.env.as_ref(), self.storage.as_ref(), &self.bus)
            .resume(&mut state)
            .await;
        self.settle(&mut active, state, step).await
    }

    /// Hands a callback to a session restored from storage by a fresh
    /// orchestrator, for example after the host process was recreated.
    pub fn reattach(&self, session_id: &str, callback: SharedCallback) {
        self.dispatcher.lock().register(session_id, callback);
    }

    /// Teardown hook. `finishing == false` is a recreate and keeps the
    /// session; `true` abandons it without a callback.
    #[tracing::instrument(skip(self))]
    pub async fn on_surface_destroyed(&self, session_id: &str, finishing: bool) -> GrantResult<()> {
        if !finishing {
            tracing::debug!(session_id, "surface recreating; session retained");
            return Ok(());
        }
        let mut active = self.active.lock().await;
        if active.as_deref() == Some(session_id) {
            *active = None;
        }
        self.abandon(session_id, AbandonReason::SurfaceDestroyed)
            .await
    }

    /// Sessions left waiting on a settings surface, oldest first. After the
    /// host process is recreated this is how the glue finds what to
    /// [`reattach`](Self::reattach) and resume.
    pub async fn suspended_sessions(&self) -> GrantResult<Vec<GrantSnapshot>> {
        let mut snapshots = Vec::new();
        for session_id in SessionState::stored_ids(self.storage.as_ref()).await? {
            match SessionState::load(self.storage.as_ref(), &session_id).await? {
                Some(state) if state.phase() == Phase::Suspended => {
                    snapshots.push(state.snapshot())
                }
                _ => {}
            }
        }
        Ok(snapshots)
    }

    /// Snapshot of a session waiting on a settings surface.
    pub async fn session_state(&self, session_id: &str) -> GrantResult<Option<GrantSnapshot>> {
        let state = SessionState::load(self.storage.as_ref(), session_id).await?;
        Ok(state.map(|state| state.snapshot()))
    }

    async fn settle(
        &self,
        active: &mut Option<String>,
        mut state: SessionState,
        step: GrantResult<Step>,
    ) -> GrantResult<SessionStatus> {
        let session_id = state.session_id().to_string();
        match step {
            Ok(Step::Suspended {
                suspension,
                capability,
                target,
            }) => {
                *active = Some(session_id.clone());
                Ok(SessionStatus::Suspended {
                    session_id,
                    suspension,
                    capability,
                    target,
                })
            }
            Ok(Step::Finished) => {
                *active = None;
                state.complete();
                SessionState::delete(self.storage.as_ref(), &session_id).await?;

                let report = aggregate(&state);
                tracing::info!(
                    session_id = %session_id,
                    granted = report.outcome.is_granted(),
                    optional_denied = ?report.optional_denied,
                    "session completed"
                );
                self.bus.emit(GrantEvent::SessionCompleted(SessionCompletedPayload {
                    session_id: session_id.clone(),
                    outcome: report.outcome.clone(),
                    optional_denied: report.optional_denied.clone(),
                    at: now_rfc3339(),
                }));

                let callback = self.dispatcher.lock().claim(&session_id);
                match callback {
                    Some(callback) => notify(callback.as_ref(), &report.outcome, self.env.as_ref()),
                    None => tracing::warn!(session_id = %session_id, "no callback registered for session"),
                }
                Ok(SessionStatus::Completed { session_id, report })
            }
            Err(error) => {
                *active = None;
                tracing::warn!(session_id = %session_id, %error, "session failed");
                if let Err(cleanup) = self.abandon(&session_id, AbandonReason::Failed).await {
                    tracing::warn!(session_id = %session_id, error = %cleanup, "failed to discard session state");
                }
                Err(error)
            }
        }
    }

    async fn abandon(&self, session_id: &str, reason: AbandonReason) -> GrantResult<()> {
        let dropped = self.dispatcher.lock().abandon(session_id);
        let deleted = SessionState::delete(self.storage.as_ref(), session_id).await?;
        if dropped || deleted {
            tracing::info!(session_id, ?reason, "session abandoned");
            self.bus.emit(GrantEvent::SessionAbandoned(SessionAbandonedPayload {
                session_id: session_id.to_string(),
                reason,
                at: now_rfc3339(),
            }));
        }
        Ok(())
    }

    fn stale(&self, session_id: &str) -> SessionStatus {
        tracing::info!(session_id, "ignoring resume for settled session");
        SessionStatus::Stale {
            session_id: session_id.to_string(),
        }
    }
}
