//! # FindMyClass Core Library
//!
//! Core logic behind the FindMyClass weekly schedule: a Monday to Friday
//! time grid, placement of calendar events onto it, and the sync gate that
//! decides when the calendar provider may be queried.
//!
//! The `findmyclass` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Schedule**: grid geometry and event placement. Pure, no I/O.
//! - **Sync**: the gated fetch state machine holding the last good event list
//! - **Integrations**: calendar provider and credential store seams, with a
//!   Google Calendar client and an OS keyring store
//! - **Storage**: TOML configuration and the local session record
//!
//! ## Key Components
//!
//! - [`GridLayout`]: grid rendering and event placement
//! - [`ScheduleSync`]: gated sync over a provider, credentials and session
//! - [`GoogleCalendarProvider`]: Calendar API v3 events client
//! - [`Config`]: application configuration management

pub mod error;
pub mod integrations;
pub mod schedule;
pub mod storage;
pub mod sync;

pub use error::{ConfigError, CoreError, CredentialError, ProviderError};
pub use integrations::{
    CalendarProvider, CredentialStore, ErrorPayloadPolicy, FetchWindow, GoogleCalendarProvider,
    KeyringStore, MemoryStore, SessionState, PROVIDER_TOKEN_KEY,
};
pub use schedule::{CalendarEvent, EventDateTime, GridDescription, GridLayout, GridPosition, Overlay};
pub use storage::{Config, SessionStore};
pub use sync::{ScheduleSync, SyncError, SyncReport, SyncState};
