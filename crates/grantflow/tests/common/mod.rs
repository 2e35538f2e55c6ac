#![allow(dead_code)]

use std::sync::Arc;

use grantflow::event::GrantEvent;
use grantflow::{
    Callback, Denial, Environment, MemoryStorage, Orchestrator, ScriptedEnvironment,
    SharedStorage,
};
use parking_lot::Mutex;
use tokio::sync::broadcast;

pub const APP_NAME: &str = "Launcher";
pub const PACKAGE: &str = "com.example.launcher";

/// Callback that remembers every notification it receives.
#[derive(Default)]
pub struct Recorder {
    granted: Mutex<usize>,
    denials: Mutex<Vec<Denial>>,
}

impl Recorder {
    pub fn shared() -> Arc<Recorder> {
        Arc::new(Recorder::default())
    }

    pub fn granted(&self) -> usize {
        *self.granted.lock()
    }

    pub fn denials(&self) -> Vec<Denial> {
        self.denials.lock().clone()
    }

    pub fn total(&self) -> usize {
        self.granted() + self.denials.lock().len()
    }
}

impl Callback for Recorder {
    fn all_required_granted(&self, _env: &dyn Environment) {
        *self.granted.lock() += 1;
    }

    fn any_required_denied(&self, denial: &Denial) {
        self.denials.lock().push(denial.clone());
    }
}

pub fn env() -> Arc<ScriptedEnvironment> {
    Arc::new(ScriptedEnvironment::default())
}

pub fn orchestrator(env: &Arc<ScriptedEnvironment>) -> Orchestrator {
    Orchestrator::new(env.clone(), Arc::new(MemoryStorage::new()))
}

pub fn orchestrator_with(env: &Arc<ScriptedEnvironment>, storage: SharedStorage) -> Orchestrator {
    Orchestrator::new(env.clone(), storage)
}

pub fn drain(receiver: &mut broadcast::Receiver<GrantEvent>) -> Vec<GrantEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
