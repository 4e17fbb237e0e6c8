//! Integration tests for the full sync path: session file, credential
//! store, Google provider against a mock server, and grid placement.

use chrono::NaiveDate;
use findmyclass_core::storage::CalendarConfig;
use findmyclass_core::{
    CredentialStore, FetchWindow, GoogleCalendarProvider, GridLayout, MemoryStore, ScheduleSync,
    SessionStore, SyncError, SyncState, PROVIDER_TOKEN_KEY,
};
use mockito::Matcher;

const WEEK_BODY: &str = r#"{
  "kind": "calendar#events",
  "items": [
    {
      "id": "cs225-lec",
      "summary": "CS 225 Lecture",
      "location": "Siebel 1404",
      "start": {"dateTime": "2023-10-16T09:00:00Z"},
      "end": {"dateTime": "2023-10-16T10:00:00Z"}
    },
    {
      "id": "brunch",
      "summary": "Brunch",
      "start": {"dateTime": "2023-10-15T11:00:00Z"},
      "end": {"dateTime": "2023-10-15T12:00:00Z"}
    }
  ]
}"#;

fn week() -> FetchWindow {
    FetchWindow::week_of(NaiveDate::from_ymd_opt(2023, 10, 16).unwrap(), None)
}

fn provider_for(server: &mockito::ServerGuard) -> GoogleCalendarProvider {
    GoogleCalendarProvider::new(&CalendarConfig {
        api_base_url: server.url(),
        ..CalendarConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_signed_in_sync_places_weekday_events() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionStore::at(dir.path().join("session.toml"));
    session.start("student@illinois.edu").unwrap();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/calendars/primary/events")
        .match_header("authorization", "Bearer ya29.live")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(WEEK_BODY)
        .create_async()
        .await;

    let mut sync = ScheduleSync::new(
        provider_for(&server),
        MemoryStore::with_entry(PROVIDER_TOKEN_KEY, "ya29.live"),
        session,
        GridLayout::default(),
    )
    .with_window(week());

    let report = sync.request_sync().await.unwrap();
    mock.assert_async().await;

    assert_eq!(report.event_count, 2);
    assert_eq!(report.placed_count, 1);

    let overlay = sync.overlay();
    assert_eq!(overlay.len(), 1);
    let block = &overlay.blocks[0];
    assert_eq!(block.key, "cs225-lec");
    assert_eq!(block.location.as_deref(), Some("Siebel 1404"));
    assert_eq!(block.position.day_index, 0);
    assert_eq!(block.position.top_offset, 100.0);
    assert_eq!(block.position.height, 60.0);
    assert_eq!(block.position.left_offset, 50.0);
}

#[tokio::test]
async fn test_signed_out_sync_never_reaches_provider() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionStore::at(dir.path().join("session.toml"));

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut sync = ScheduleSync::new(
        provider_for(&server),
        MemoryStore::with_entry(PROVIDER_TOKEN_KEY, "ya29.stale"),
        session,
        GridLayout::default(),
    )
    .with_window(week());

    let err = sync.request_sync().await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err, SyncError::AuthenticationRequired);
    assert_eq!(sync.credentials().get(PROVIDER_TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_rejected_token_keeps_last_good_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionStore::at(dir.path().join("session.toml"));
    session.start("student@illinois.edu").unwrap();

    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(WEEK_BODY)
        .expect(1)
        .create_async()
        .await;

    let mut sync = ScheduleSync::new(
        provider_for(&server),
        MemoryStore::with_entry(PROVIDER_TOKEN_KEY, "ya29.live"),
        session,
        GridLayout::default(),
    )
    .with_window(week());

    sync.request_sync().await.unwrap();
    ok.assert_async().await;
    ok.remove_async().await;

    server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
        .create_async()
        .await;

    let err = sync.request_sync().await.unwrap_err();

    assert!(matches!(err, SyncError::FetchFailed(_)));
    assert!(matches!(sync.state(), SyncState::SyncFailed { .. }));
    assert_eq!(sync.events().len(), 2);
    assert_eq!(sync.overlay().len(), 1);
}

#[tokio::test]
async fn test_ending_session_blocks_next_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    SessionStore::at(&path).start("student@illinois.edu").unwrap();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(WEEK_BODY)
        .create_async()
        .await;

    let mut sync = ScheduleSync::new(
        provider_for(&server),
        MemoryStore::with_entry(PROVIDER_TOKEN_KEY, "ya29.live"),
        SessionStore::at(&path),
        GridLayout::default(),
    )
    .with_window(week());

    sync.request_sync().await.unwrap();

    SessionStore::at(&path).end().unwrap();
    sync.end_session();

    assert!(sync.events().is_empty());
    assert_eq!(
        sync.request_sync().await.unwrap_err(),
        SyncError::AuthenticationRequired
    );
}
