mod config;
pub mod session;

pub use config::{CalendarConfig, Config, GridConfig};
pub use session::{SessionRecord, SessionStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `FINDMYCLASS_DATA_DIR` wins when set. Otherwise `~/.config/findmyclass[-dev]/`
/// based on `FINDMYCLASS_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FINDMYCLASS_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("FINDMYCLASS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("findmyclass-dev")
            } else {
                base_dir.join("findmyclass")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
