//! Google Calendar provider.
//!
//! Lists events from a single calendar over the Calendar v3 REST API using a
//! bearer access token. Recurring events are expanded server-side
//! (`singleEvents=true`) and pages are followed until `nextPageToken` runs out.
//! A repeated page token, or more pages than [`MAX_EVENTS_PER_FETCH`] allows
//! at the configured `max_results`, fails the fetch.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::traits::{CalendarProvider, FetchWindow};
use crate::error::ProviderError;
use crate::schedule::CalendarEvent;
use crate::storage::CalendarConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
/// Google's alias for the user's main calendar.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// What to do with a 2xx response whose body carries an `error` object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPayloadPolicy {
    /// Report it as a failed fetch.
    #[default]
    Fail,
    /// Treat it as an empty, successful result.
    Empty,
}

impl std::str::FromStr for ErrorPayloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "empty" => Ok(Self::Empty),
            other => Err(format!("expected 'fail' or 'empty', got '{other}'")),
        }
    }
}

/// Most events one fetch will collect before giving up on paging.
pub const MAX_EVENTS_PER_FETCH: u32 = 5000;

/// Page-token bookkeeping for one fetch.
#[derive(Debug)]
struct PageCursor {
    seen: HashSet<String>,
    pages: usize,
    max_pages: usize,
}

impl PageCursor {
    fn new(max_results: u32) -> Self {
        Self {
            seen: HashSet::new(),
            pages: 0,
            max_pages: MAX_EVENTS_PER_FETCH.div_ceil(max_results.max(1)) as usize,
        }
    }

    /// Count a fetched page and vet its `nextPageToken`.
    fn advance(&mut self, next: Option<String>) -> Result<Option<String>, ProviderError> {
        self.pages += 1;
        let Some(token) = next else {
            return Ok(None);
        };
        if !self.seen.insert(token.clone()) {
            return Err(ProviderError::Paging(format!(
                "page token '{token}' was returned twice"
            )));
        }
        if self.pages >= self.max_pages {
            return Err(ProviderError::Paging(format!(
                "still paging after {} pages",
                self.pages
            )));
        }
        Ok(Some(token))
    }
}

/// One decoded page of the events listing.
#[derive(Debug, Default)]
pub struct EventsPage {
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
    /// Set when the body carried a top-level `error`.
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default)]
    items: Vec<CalendarEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Decode one page of `events.list`.
pub fn parse_events_page(body: &str) -> Result<EventsPage, ProviderError> {
    let raw: RawPage = serde_json::from_str(body)?;
    Ok(EventsPage {
        items: raw.items,
        next_page_token: raw.next_page_token.filter(|t| !t.is_empty()),
        error: raw.error.as_ref().map(error_message),
    })
}

/// Human-readable message from a Google `error` value (object or string).
fn error_message(err: &serde_json::Value) -> String {
    err.get("message")
        .and_then(|m| m.as_str())
        .or_else(|| err.as_str())
        .map(String::from)
        .unwrap_or_else(|| err.to_string())
}

/// Google Calendar events client.
pub struct GoogleCalendarProvider {
    client: Client,
    api_base_url: String,
    calendar_id: String,
    max_results: u32,
    error_payload: ErrorPayloadPolicy,
}

impl GoogleCalendarProvider {
    pub fn new(config: &CalendarConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            calendar_id: config.calendar_id.clone(),
            max_results: config.max_results,
            error_payload: config.error_payload,
        })
    }

    fn events_url(&self) -> Result<Url, ProviderError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base_url.trim_end_matches('/'),
            urlencoding::encode(&self.calendar_id)
        );
        Ok(Url::parse(&url)?)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        access_token: &str,
        window: &FetchWindow,
        page_token: Option<&str>,
    ) -> Result<EventsPage, ProviderError> {
        let mut query = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeMin", window.time_min.to_rfc3339()),
            ("timeMax", window.time_max.to_rfc3339()),
            ("maxResults", self.max_results.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = match status {
                StatusCode::UNAUTHORIZED => {
                    "access token rejected; re-link the calendar account".to_string()
                }
                _ => serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("error").map(error_message))
                    .unwrap_or(body),
            };
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parse_events_page(&body)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn fetch_events(
        &self,
        access_token: &str,
        window: &FetchWindow,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        let url = self.events_url()?;
        let mut events = Vec::new();
        let mut cursor = PageCursor::new(self.max_results);
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_page(&url, access_token, window, page_token.as_deref())
                .await?;

            if let Some(message) = page.error {
                return match self.error_payload {
                    ErrorPayloadPolicy::Fail => Err(ProviderError::ErrorPayload(message)),
                    ErrorPayloadPolicy::Empty => {
                        tracing::warn!(%message, "calendar returned an error payload, treating as empty");
                        Ok(Vec::new())
                    }
                };
            }

            tracing::debug!(count = page.items.len(), "fetched calendar page");
            events.extend(page.items);

            page_token = cursor.advance(page.next_page_token)?;
            if page_token.is_none() {
                break;
            }
        }

        Ok(events)
    }
}
