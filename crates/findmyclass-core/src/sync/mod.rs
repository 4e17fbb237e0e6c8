//! Calendar synchronization.
//!
//! The sync gate decides whether a fetch may happen at all, runs it against
//! the configured provider, and holds the last good event list.

pub mod gate;
pub mod types;

#[cfg(test)]
mod gate_tests;

pub use gate::ScheduleSync;
pub use types::{SyncError, SyncGateState, SyncReport, SyncState};
