//! Seams between the sync engine and the outside world.
//!
//! The engine only ever talks to these traits; the concrete Google client,
//! OS keyring and session file live behind them so tests can swap in
//! in-memory versions.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, ProviderError};
use crate::schedule::{start_of_day, CalendarEvent};

/// Key under which the provider access token is stored.
pub const PROVIDER_TOKEN_KEY: &str = "provider_access_token";

/// Half-open time range `[time_min, time_max)` to fetch events for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl FetchWindow {
    /// Monday 00:00 through the following Monday 00:00 of the week containing
    /// `date`, read in `zone` (UTC when no zone is given).
    pub fn week_of(date: NaiveDate, zone: Option<Tz>) -> Self {
        let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        let next_monday = monday + Duration::days(7);
        Self {
            time_min: midnight(monday, zone),
            time_max: midnight(next_monday, zone),
        }
    }

    /// The current week in `zone`.
    pub fn this_week(zone: Option<Tz>) -> Self {
        let now = Utc::now();
        let today = match zone {
            Some(tz) => now.with_timezone(&tz).date_naive(),
            None => now.date_naive(),
        };
        Self::week_of(today, zone)
    }
}

fn midnight(date: NaiveDate, zone: Option<Tz>) -> DateTime<Utc> {
    start_of_day(date, zone)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Remote calendar that can list events.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Short identifier (e.g. "google").
    fn name(&self) -> &str;

    /// Fetch every event in `window`. Resolves exactly once per call.
    async fn fetch_events(
        &self,
        access_token: &str,
        window: &FetchWindow,
    ) -> Result<Vec<CalendarEvent>, ProviderError>;
}

/// Synchronous key/value credential storage.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CredentialError>;
}

/// Whether a user is currently signed in to the app.
pub trait SessionState: Send + Sync {
    fn is_authenticated(&self) -> bool;
}
