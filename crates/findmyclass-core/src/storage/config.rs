//! TOML-based application configuration.
//!
//! Stores:
//! - Grid pixel metrics and the display time zone
//! - Calendar provider settings (calendar id, endpoint, paging, timeouts)
//! - How provider error payloads are interpreted
//!
//! Configuration is stored at `~/.config/findmyclass/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::integrations::google::{DEFAULT_API_BASE_URL, DEFAULT_CALENDAR_ID};
use crate::integrations::ErrorPayloadPolicy;
use crate::schedule::grid::{COLUMN_WIDTH, HEADER_OFFSET, ROW_HEIGHT, TIME_COLUMN_WIDTH};
use crate::schedule::{GridLayout, GridMetrics};

/// Grid geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    #[serde(default = "default_header_offset")]
    pub header_offset: f64,
    #[serde(default = "default_time_column_width")]
    pub time_column_width: f64,
    #[serde(default = "default_column_width")]
    pub column_width: f64,
    /// IANA zone used to read event times (e.g. "America/Chicago").
    /// Unset means each event's own offset is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Calendar provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub error_payload: ErrorPayloadPolicy,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/findmyclass/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

// Default functions
fn default_row_height() -> f64 {
    ROW_HEIGHT
}
fn default_header_offset() -> f64 {
    HEADER_OFFSET
}
fn default_time_column_width() -> f64 {
    TIME_COLUMN_WIDTH
}
fn default_column_width() -> f64 {
    COLUMN_WIDTH
}
fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.into()
}
fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}
fn default_max_results() -> u32 {
    250
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: default_row_height(),
            header_offset: default_header_offset(),
            time_column_width: default_time_column_width(),
            column_width: default_column_width(),
            timezone: None,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            api_base_url: default_api_base_url(),
            max_results: default_max_results(),
            request_timeout_secs: default_request_timeout_secs(),
            error_payload: ErrorPayloadPolicy::default(),
        }
    }
}

impl GridConfig {
    /// Parse the configured zone and build the layout.
    pub fn layout(&self) -> Result<GridLayout, ConfigError> {
        let zone = match self.timezone.as_deref() {
            None | Some("") => None,
            Some(name) => Some(name.parse::<chrono_tz::Tz>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: "grid.timezone".into(),
                    message: e.to_string(),
                }
            })?),
        };
        let metrics = GridMetrics {
            row_height: self.row_height,
            header_offset: self.header_offset,
            time_column_width: self.time_column_width,
            column_width: self.column_width,
        };
        Ok(GridLayout::new(metrics, zone))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj.get(part);

                let new_value = match existing {
                    Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    Some(serde_json::Value::Number(_)) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    Some(_) => serde_json::Value::String(value.into()),
                    // Optional keys are skipped when unset, so they are absent here.
                    None if Self::is_optional_key(key) => serde_json::Value::String(value.into()),
                    None => return Err(ConfigError::UnknownKey(key.to_string())),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn is_optional_key(key: &str) -> bool {
        key == "grid.timezone"
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values that would break layout or fetching.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid.row_height", self.grid.row_height),
            ("grid.column_width", self.grid.column_width),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("must be a positive number, got {value}"),
                });
            }
        }

        self.grid.layout()?;

        url::Url::parse(&self.calendar.api_base_url).map_err(|e| ConfigError::InvalidValue {
            key: "calendar.api_base_url".into(),
            message: e.to_string(),
        })?;

        if !(1..=2500).contains(&self.calendar.max_results) {
            return Err(ConfigError::InvalidValue {
                key: "calendar.max_results".into(),
                message: "must be between 1 and 2500".into(),
            });
        }
        if self.calendar.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "calendar.request_timeout_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory after type-checking and validating it.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }
}
