//! Local record of the signed-in user.
//!
//! The identity provider itself is external; this file only remembers that
//! a sign-in happened so the sync gate can check for it. Stored as TOML at
//! `<data_dir>/session.toml`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, Result};
use crate::integrations::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user: String,
    pub started_at: DateTime<Utc>,
}

/// File-backed session indicator.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default location.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("session.toml")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a sign-in for `user`, replacing any previous session.
    pub fn start(&self, user: &str) -> Result<SessionRecord> {
        let user = user.trim();
        if user.is_empty() {
            return Err(CoreError::Session("user must not be empty".into()));
        }
        let record = SessionRecord {
            user: user.to_string(),
            started_at: Utc::now(),
        };
        let content =
            toml::to_string_pretty(&record).map_err(|e| CoreError::Session(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        tracing::info!(user = %record.user, "session started");
        Ok(record)
    }

    /// Forget the current session. Ending when none exists is fine.
    pub fn end(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("session ended");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The current session, if any.
    ///
    /// An unreadable or corrupt file counts as no session.
    pub fn current(&self) -> Option<SessionRecord> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match toml::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }
}

impl SessionState for SessionStore {
    fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}
