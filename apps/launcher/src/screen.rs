use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use grantflow::{Callback, Denial, Environment, Orchestrator, SessionConfig, SessionStatus};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    MainScreen,
    Exit,
}

#[derive(Default)]
struct LaunchCallback {
    destination: Mutex<Option<Destination>>,
}

impl LaunchCallback {
    fn set(&self, destination: Destination) {
        if let Ok(mut slot) = self.destination.lock() {
            *slot = Some(destination);
        }
    }

    fn destination(&self) -> Option<Destination> {
        self.destination.lock().ok().and_then(|slot| *slot)
    }
}

impl Callback for LaunchCallback {
    fn all_required_granted(&self, env: &dyn Environment) {
        info!(platform = env.id(), "all required capabilities granted");
        self.set(Destination::MainScreen);
    }

    fn any_required_denied(&self, denial: &Denial) {
        warn!(capability = %denial.capability, "required capability denied");
        self.set(Destination::Exit);
    }
}

/// Waits out the splash delay, then runs the session to its end. Each
/// settings round trip is played as a surface recreate followed by resume.
pub async fn run(
    orchestrator: &Orchestrator,
    config: SessionConfig,
    delay: Duration,
) -> Result<Destination> {
    tokio::time::sleep(delay).await;

    let callback = Arc::new(LaunchCallback::default());
    let mut status = orchestrator.check_and_show(config, callback.clone()).await?;
    loop {
        match status {
            SessionStatus::Suspended {
                session_id,
                suspension,
                capability,
                target,
            } => {
                info!(%capability, action = %target.action, "left for settings surface");
                orchestrator.on_surface_destroyed(&session_id, false).await?;
                status = orchestrator.resume(&session_id, suspension).await?;
            }
            SessionStatus::Completed { report, .. } => {
                if !report.optional_denied.is_empty() {
                    info!(optional_denied = ?report.optional_denied, "continuing without optional capabilities");
                }
                break;
            }
            SessionStatus::Stale { session_id } => {
                bail!("session {session_id} settled before the launch screen resumed it")
            }
        }
    }

    callback
        .destination()
        .context("session completed without notifying the launch screen")
}
