//! Schedule sync engine.
//!
//! Gates every sync on a signed-in session and a stored provider token,
//! fetches the week's events, and keeps the last good event list for the
//! grid overlay.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> AuthenticationRequired | ProviderTokenMissing
//! Idle -> Syncing -> (SyncComplete | SyncFailed)
//! any state but Syncing -> Idle   (acknowledge)
//! ```
//!
//! `request_sync` borrows the engine mutably, so a second sync cannot start
//! while one is awaiting the provider. No retries and no timeout of its own.

use chrono::{DateTime, Utc};

use super::types::{SyncError, SyncGateState, SyncReport, SyncState};
use crate::integrations::{
    CalendarProvider, CredentialStore, FetchWindow, SessionState, PROVIDER_TOKEN_KEY,
};
use crate::schedule::{CalendarEvent, GridLayout, Overlay};

pub struct ScheduleSync<P, C, S> {
    provider: P,
    credentials: C,
    session: S,
    layout: GridLayout,
    window: FetchWindow,
    state: SyncState,
    events: Vec<CalendarEvent>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl<P, C, S> ScheduleSync<P, C, S>
where
    P: CalendarProvider,
    C: CredentialStore,
    S: SessionState,
{
    /// Starts `Idle` with no events, fetching the current week.
    pub fn new(provider: P, credentials: C, session: S, layout: GridLayout) -> Self {
        Self {
            provider,
            credentials,
            session,
            layout,
            window: FetchWindow::this_week(layout.zone),
            state: SyncState::Idle,
            events: Vec::new(),
            last_synced_at: None,
        }
    }

    pub fn with_window(mut self, window: FetchWindow) -> Self {
        self.window = window;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn window(&self) -> &FetchWindow {
        &self.window
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Current gate inputs. Read fresh, never cached.
    pub fn gate_state(&self) -> SyncGateState {
        SyncGateState {
            has_session: self.session.is_authenticated(),
            has_provider_token: self.provider_token().is_some(),
        }
    }

    /// The held events positioned on the grid.
    pub fn overlay(&self) -> Overlay {
        self.layout.build_overlay(&self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one gated sync.
    ///
    /// On failure the previously held events are kept untouched.
    pub async fn request_sync(&mut self) -> Result<SyncReport, SyncError> {
        let gate = self.gate_state();

        if !gate.has_session {
            if let Err(e) = self.credentials.remove(PROVIDER_TOKEN_KEY) {
                tracing::warn!(error = %e, "failed to clear provider token");
            }
            tracing::warn!("sync refused: no active session");
            self.state = SyncState::AuthenticationRequired;
            return Err(SyncError::AuthenticationRequired);
        }

        let token = if gate.has_provider_token {
            self.provider_token()
        } else {
            None
        };
        let Some(token) = token else {
            tracing::warn!(provider = self.provider.name(), "sync refused: no provider token");
            self.state = SyncState::ProviderTokenMissing;
            return Err(SyncError::ProviderTokenMissing);
        };

        self.state = SyncState::Syncing;
        tracing::info!(
            provider = self.provider.name(),
            from = %self.window.time_min,
            to = %self.window.time_max,
            "sync started"
        );

        match self.provider.fetch_events(&token, &self.window).await {
            Ok(events) => {
                let synced_at = Utc::now();
                self.events = events;
                self.last_synced_at = Some(synced_at);
                let event_count = self.events.len();
                let placed_count = self.overlay().len();
                self.state = SyncState::SyncComplete {
                    event_count,
                    synced_at,
                };
                tracing::info!(event_count, placed_count, "sync complete");
                Ok(SyncReport {
                    event_count,
                    placed_count,
                    synced_at,
                })
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "sync failed");
                self.state = SyncState::SyncFailed {
                    message: message.clone(),
                };
                Err(SyncError::FetchFailed(message))
            }
        }
    }

    /// Return to `Idle` after the caller has shown the result.
    ///
    /// Returns `false` (and does nothing) while a sync is in flight.
    pub fn acknowledge(&mut self) -> bool {
        if self.state.is_syncing() {
            return false;
        }
        self.state = SyncState::Idle;
        true
    }

    /// Drop everything tied to the signed-in user.
    pub fn end_session(&mut self) {
        self.events.clear();
        self.last_synced_at = None;
        self.state = SyncState::Idle;
    }

    fn provider_token(&self) -> Option<String> {
        match self.credentials.get(PROVIDER_TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read provider token");
                None
            }
        }
    }
}
