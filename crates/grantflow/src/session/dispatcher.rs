use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::platform::Environment;
use crate::session::aggregator::{Denial, Outcome};

pub const DEFAULT_SETTLED_HISTORY: usize = 256;

/// Terminal handler supplied by the caller of check-and-show.
pub trait Callback: Send + Sync {
    fn all_required_granted(&self, env: &dyn Environment);
    fn any_required_denied(&self, denial: &Denial);
}

pub type SharedCallback = Arc<dyn Callback>;

/// [`Callback`] built from two closures.
pub struct FnCallback<G, D> {
    on_granted: G,
    on_denied: D,
}

impl<G, D> FnCallback<G, D>
where
    G: Fn(&dyn Environment) + Send + Sync + 'static,
    D: Fn(&Denial) + Send + Sync + 'static,
{
    pub fn new(on_granted: G, on_denied: D) -> Self {
        Self {
            on_granted,
            on_denied,
        }
    }

    pub fn shared(on_granted: G, on_denied: D) -> SharedCallback {
        Arc::new(Self::new(on_granted, on_denied))
    }
}

impl<G, D> Callback for FnCallback<G, D>
where
    G: Fn(&dyn Environment) + Send + Sync,
    D: Fn(&Denial) + Send + Sync,
{
    fn all_required_granted(&self, env: &dyn Environment) {
        (self.on_granted)(env)
    }

    fn any_required_denied(&self, denial: &Denial) {
        (self.on_denied)(denial)
    }
}

/// Holds each session's handler until it is claimed exactly once, either to
/// be fired or to be dropped on abandonment. Settled session ids are
/// remembered (bounded) so late duplicate signals are recognised.
pub struct CallbackDispatcher {
    pending: HashMap<String, SharedCallback>,
    settled: HashSet<String>,
    settled_order: VecDeque<String>,
    history: usize,
}

impl Default for CallbackDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLED_HISTORY)
    }
}

impl CallbackDispatcher {
    pub fn new(history: usize) -> Self {
        Self {
            pending: HashMap::new(),
            settled: HashSet::new(),
            settled_order: VecDeque::new(),
            history: history.max(1),
        }
    }

    pub fn register(&mut self, session_id: &str, callback: SharedCallback) {
        if self.settled.contains(session_id) {
            return;
        }
        self.pending.insert(session_id.to_string(), callback);
    }

    /// Takes the handler for a terminal outcome. Returns `None` if the
    /// session already settled or never registered one.
    pub fn claim(&mut self, session_id: &str) -> Option<SharedCallback> {
        if self.settled.contains(session_id) {
            return None;
        }
        self.mark_settled(session_id);
        self.pending.remove(session_id)
    }

    /// Drops the handler without firing it. Returns whether one was pending.
    pub fn abandon(&mut self, session_id: &str) -> bool {
        let dropped = self.pending.remove(session_id).is_some();
        if !self.settled.contains(session_id) {
            self.mark_settled(session_id);
        }
        dropped
    }

    pub fn is_pending(&self, session_id: &str) -> bool {
        self.pending.contains_key(session_id)
    }

    pub fn is_settled(&self, session_id: &str) -> bool {
        self.settled.contains(session_id)
    }

    fn mark_settled(&mut self, session_id: &str) {
        if self.settled.insert(session_id.to_string()) {
            self.settled_order.push_back(session_id.to_string());
        }
        while self.settled_order.len() > self.history {
            if let Some(oldest) = self.settled_order.pop_front() {
                self.settled.remove(&oldest);
            }
        }
    }
}

pub fn notify(callback: &dyn Callback, outcome: &Outcome, env: &dyn Environment) {
    match outcome {
        Outcome::AllRequiredGranted => callback.all_required_granted(env),
        Outcome::AnyRequiredDenied(denial) => callback.any_required_denied(denial),
    }
}
