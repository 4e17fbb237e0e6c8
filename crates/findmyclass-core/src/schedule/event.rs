//! Calendar events as delivered by the provider.
//!
//! The shape follows the Google Calendar v3 `Event` resource, trimmed to the
//! fields the schedule grid uses. Each side of an event carries either a
//! `dateTime` (timed event) or a `date` (all-day event).

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One side (start or end) of a calendar event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// Timed value with the offset the provider reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    /// All-day value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EventDateTime {
    pub fn at(date_time: DateTime<FixedOffset>) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
        }
    }

    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date_time: None,
            date: Some(date),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }

    /// Absolute instant, preferring `dateTime` over `date`.
    ///
    /// A date-only value is midnight of that date in `zone` (UTC when no
    /// zone is given). Returns `None` when neither field is present.
    pub fn instant(&self, zone: Option<Tz>) -> Option<DateTime<Utc>> {
        if let Some(dt) = self.date_time {
            return Some(dt.with_timezone(&Utc));
        }
        start_of_day(self.date?, zone)
    }

    /// Wall-clock reading used for hour-of-day and weekday.
    ///
    /// With a zone, timed values are converted into it; without one, the
    /// offset carried by the value itself is used.
    pub fn wall_clock(&self, zone: Option<Tz>) -> Option<NaiveDateTime> {
        if let Some(dt) = self.date_time {
            return Some(match zone {
                Some(tz) => dt.with_timezone(&tz).naive_local(),
                None => dt.naive_local(),
            });
        }
        self.date?.and_hms_opt(0, 0, 0)
    }
}

/// First instant of `date` in `zone` (UTC when no zone is given).
///
/// Where local midnight falls in a DST gap, the first valid half hour after
/// it is used instead.
pub fn start_of_day(date: NaiveDate, zone: Option<Tz>) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let Some(tz) = zone else {
        return Some(midnight.and_utc());
    };
    (0..=6)
        .map(|half_hours| midnight + Duration::minutes(30 * half_hours))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

impl std::fmt::Display for EventDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.date_time, self.date) {
            (Some(dt), _) => write!(f, "{}", dt.to_rfc3339()),
            (None, Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            (None, None) => Ok(()),
        }
    }
}

/// A calendar event fetched from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
}

impl CalendarEvent {
    /// Stable key for rendering: the provider id, or `summary@start` when absent.
    pub fn key(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("{}@{}", self.summary, self.start),
        }
    }
}
