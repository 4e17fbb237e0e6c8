//! Tests for the sync gate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};

use super::gate::ScheduleSync;
use super::types::{SyncError, SyncState};
use crate::error::{CredentialError, ProviderError};
use crate::integrations::{
    CalendarProvider, CredentialStore, FetchWindow, MemoryStore, SessionState, PROVIDER_TOKEN_KEY,
};
use crate::schedule::{CalendarEvent, EventDateTime, GridLayout};

/// Provider that replays scripted results and counts calls.
#[derive(Default)]
struct ScriptedProvider {
    calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Result<Vec<CalendarEvent>, ProviderError>>>,
}

impl ScriptedProvider {
    fn returning(results: Vec<Result<Vec<CalendarEvent>, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_events(
        &self,
        access_token: &str,
        _window: &FetchWindow,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(access_token.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Credential store that records removals.
#[derive(Default)]
struct SpyStore {
    inner: MemoryStore,
    removed: Mutex<Vec<String>>,
}

impl SpyStore {
    fn with_token(token: &str) -> Self {
        Self {
            inner: MemoryStore::with_entry(PROVIDER_TOKEN_KEY, token),
            ..Self::default()
        }
    }

    fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl CredentialStore for SpyStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.removed.lock().unwrap().push(key.to_string());
        self.inner.remove(key)
    }
}

/// Store whose backend is always down.
struct BrokenStore;

impl CredentialStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CredentialError> {
        Err(CredentialError::Backend("locked".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Backend("locked".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Backend("locked".into()))
    }
}

struct FixedSession(bool);

impl SessionState for FixedSession {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

fn event(summary: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        id: Some(summary.to_lowercase()),
        summary: summary.to_string(),
        location: Some("Siebel Center".into()),
        start: EventDateTime::at(DateTime::parse_from_rfc3339(start).unwrap()),
        end: EventDateTime::at(DateTime::parse_from_rfc3339(end).unwrap()),
    }
}

fn week() -> FetchWindow {
    FetchWindow::week_of(NaiveDate::from_ymd_opt(2023, 10, 16).unwrap(), None)
}

fn engine<C: CredentialStore>(
    provider: ScriptedProvider,
    store: C,
    signed_in: bool,
) -> ScheduleSync<ScriptedProvider, C, FixedSession> {
    ScheduleSync::new(provider, store, FixedSession(signed_in), GridLayout::default())
        .with_window(week())
}

#[tokio::test]
async fn no_session_clears_token_and_skips_fetch() {
    let mut sync = engine(
        ScriptedProvider::default(),
        SpyStore::with_token("tok"),
        false,
    );

    let err = sync.request_sync().await.unwrap_err();

    assert_eq!(err, SyncError::AuthenticationRequired);
    assert_eq!(sync.state(), &SyncState::AuthenticationRequired);
    assert_eq!(sync.provider().calls(), 0);
    assert_eq!(sync.credentials().removed(), vec![PROVIDER_TOKEN_KEY.to_string()]);
    assert_eq!(sync.credentials().get(PROVIDER_TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn no_session_clears_even_when_no_token_stored() {
    let mut sync = engine(ScriptedProvider::default(), SpyStore::default(), false);

    assert!(sync.request_sync().await.is_err());
    assert_eq!(sync.credentials().removed().len(), 1);
}

#[tokio::test]
async fn missing_token_skips_fetch() {
    let mut sync = engine(ScriptedProvider::default(), SpyStore::default(), true);

    let err = sync.request_sync().await.unwrap_err();

    assert_eq!(err, SyncError::ProviderTokenMissing);
    assert!(err.is_login_required());
    assert_eq!(sync.state(), &SyncState::ProviderTokenMissing);
    assert_eq!(sync.provider().calls(), 0);
    assert!(sync.credentials().removed().is_empty());
}

#[tokio::test]
async fn empty_token_counts_as_missing() {
    let mut sync = engine(ScriptedProvider::default(), SpyStore::with_token(""), true);
    assert_eq!(
        sync.request_sync().await.unwrap_err(),
        SyncError::ProviderTokenMissing
    );
    assert_eq!(sync.provider().calls(), 0);
}

#[tokio::test]
async fn unreadable_store_counts_as_missing_token() {
    let mut sync = engine(ScriptedProvider::default(), BrokenStore, true);
    assert_eq!(
        sync.request_sync().await.unwrap_err(),
        SyncError::ProviderTokenMissing
    );
}

#[tokio::test]
async fn failed_token_removal_still_reports_auth_required() {
    let mut sync = engine(ScriptedProvider::default(), BrokenStore, false);
    assert_eq!(
        sync.request_sync().await.unwrap_err(),
        SyncError::AuthenticationRequired
    );
}

#[tokio::test]
async fn empty_result_is_a_successful_sync() {
    let mut sync = engine(
        ScriptedProvider::returning(vec![Ok(Vec::new())]),
        SpyStore::with_token("tok"),
        true,
    );

    let report = sync.request_sync().await.unwrap();

    assert_eq!(report.event_count, 0);
    assert_eq!(report.placed_count, 0);
    assert!(sync.events().is_empty());
    assert_eq!(sync.last_synced_at(), Some(report.synced_at));
    assert!(matches!(
        sync.state(),
        SyncState::SyncComplete { event_count: 0, .. }
    ));
}

#[tokio::test]
async fn fetch_uses_stored_token() {
    let mut sync = engine(
        ScriptedProvider::returning(vec![Ok(Vec::new())]),
        SpyStore::with_token("ya29.token"),
        true,
    );

    sync.request_sync().await.unwrap();

    assert_eq!(sync.provider().calls(), 1);
    assert_eq!(*sync.provider().tokens.lock().unwrap(), vec!["ya29.token".to_string()]);
}

#[tokio::test]
async fn failure_keeps_previous_events() {
    let first = vec![event("CS 225", "2023-10-16T09:00:00Z", "2023-10-16T10:00:00Z")];
    let mut sync = engine(
        ScriptedProvider::returning(vec![
            Ok(first.clone()),
            Err(ProviderError::ErrorPayload("backend unavailable".into())),
        ]),
        SpyStore::with_token("tok"),
        true,
    );

    sync.request_sync().await.unwrap();
    let synced_at = sync.last_synced_at();
    let err = sync.request_sync().await.unwrap_err();

    assert_eq!(
        err,
        SyncError::FetchFailed("Calendar API error: backend unavailable".into())
    );
    assert_eq!(sync.events(), first.as_slice());
    assert_eq!(sync.last_synced_at(), synced_at);
    assert!(matches!(sync.state(), SyncState::SyncFailed { .. }));
}

#[tokio::test]
async fn success_replaces_event_list() {
    let mut sync = engine(
        ScriptedProvider::returning(vec![
            Ok(vec![event("Old", "2023-10-16T09:00:00Z", "2023-10-16T10:00:00Z")]),
            Ok(vec![event("New", "2023-10-17T11:00:00Z", "2023-10-17T12:00:00Z")]),
        ]),
        SpyStore::with_token("tok"),
        true,
    );

    sync.request_sync().await.unwrap();
    sync.request_sync().await.unwrap();

    assert_eq!(sync.events().len(), 1);
    assert_eq!(sync.events()[0].summary, "New");
}

#[tokio::test]
async fn weekday_and_weekend_events_yield_one_block() {
    let mut sync = engine(
        ScriptedProvider::returning(vec![Ok(vec![
            event("Algorithms", "2023-10-16T09:00:00Z", "2023-10-16T10:00:00Z"),
            event("Brunch", "2023-10-15T11:00:00Z", "2023-10-15T12:00:00Z"),
        ])]),
        SpyStore::with_token("tok"),
        true,
    );

    let report = sync.request_sync().await.unwrap();
    let overlay = sync.overlay();

    assert_eq!(report.event_count, 2);
    assert_eq!(report.placed_count, 1);
    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay.blocks[0].summary, "Algorithms");
    assert_eq!(overlay.blocks[0].position.day_index, 0);
}

#[tokio::test]
async fn acknowledge_returns_to_idle() {
    let mut sync = engine(ScriptedProvider::default(), SpyStore::default(), true);

    let _ = sync.request_sync().await;
    assert_eq!(sync.state(), &SyncState::ProviderTokenMissing);

    assert!(sync.acknowledge());
    assert_eq!(sync.state(), &SyncState::Idle);
}

#[tokio::test]
async fn end_session_discards_events() {
    let mut sync = engine(
        ScriptedProvider::returning(vec![Ok(vec![event(
            "CS 225",
            "2023-10-16T09:00:00Z",
            "2023-10-16T10:00:00Z",
        )])]),
        SpyStore::with_token("tok"),
        true,
    );
    sync.request_sync().await.unwrap();

    sync.end_session();

    assert!(sync.events().is_empty());
    assert!(sync.last_synced_at().is_none());
    assert_eq!(sync.state(), &SyncState::Idle);
}

#[test]
fn gate_state_reads_collaborators() {
    let sync = engine(ScriptedProvider::default(), SpyStore::with_token("tok"), true);
    let gate = sync.gate_state();
    assert!(gate.has_session);
    assert!(gate.has_provider_token);
}

#[tokio::test]
async fn refusal_matches_gate_state() {
    let mut signed_out = engine(ScriptedProvider::default(), SpyStore::with_token("tok"), false);
    assert!(!signed_out.gate_state().has_session);
    assert_eq!(
        signed_out.request_sync().await.unwrap_err(),
        SyncError::AuthenticationRequired
    );
    assert!(!signed_out.gate_state().has_provider_token);

    let mut unlinked = engine(ScriptedProvider::default(), SpyStore::default(), true);
    let gate = unlinked.gate_state();
    assert!(gate.has_session && !gate.has_provider_token);
    assert_eq!(
        unlinked.request_sync().await.unwrap_err(),
        SyncError::ProviderTokenMissing
    );
}
