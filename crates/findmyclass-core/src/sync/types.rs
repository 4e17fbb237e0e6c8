//! Core types for calendar synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the sync gate currently stands.
///
/// `Idle` is the initial state. Every state except `Syncing` goes back to
/// `Idle` once the caller acknowledges it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    SyncComplete {
        event_count: usize,
        synced_at: DateTime<Utc>,
    },
    SyncFailed {
        message: String,
    },
    AuthenticationRequired,
    ProviderTokenMissing,
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncState::Syncing)
    }
}

/// Inputs to the gate, read fresh on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGateState {
    pub has_session: bool,
    pub has_provider_token: bool,
}

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Events returned by the provider.
    pub event_count: usize,
    /// Events that landed on a weekday column.
    pub placed_count: usize,
    pub synced_at: DateTime<Utc>,
}

/// Why a sync did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("not signed in; log in to sync your schedule")]
    AuthenticationRequired,

    #[error("calendar account not linked; log in to your calendar provider")]
    ProviderTokenMissing,

    #[error("sync failed: {0}")]
    FetchFailed(String),
}

impl SyncError {
    /// Both gate failures ask the user to log in somewhere.
    pub fn is_login_required(&self) -> bool {
        matches!(
            self,
            SyncError::AuthenticationRequired | SyncError::ProviderTokenMissing
        )
    }
}
