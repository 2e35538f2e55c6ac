pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod manager;
pub mod sequencer;
pub mod state;

pub use aggregator::{Denial, Outcome, SessionReport};
pub use config::{SessionConfig, SessionConfigBuilder, Theme};
pub use dispatcher::{Callback, CallbackDispatcher, FnCallback, SharedCallback};
pub use manager::{Orchestrator, SessionStatus};
pub use sequencer::{Sequencer, Step};
pub use state::{GrantSnapshot, GrantStatus, Group, Phase, SessionState, SnapshotEntry, WorkItem};
