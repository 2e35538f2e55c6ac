//! Cross-session permission bookkeeping.

pub mod rationale;

pub use rationale::RationaleTracker;
