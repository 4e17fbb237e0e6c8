//! Core error types for findmyclass-core.
//!
//! This module defines the error hierarchy using thiserror. Sync gate
//! outcomes live in [`crate::sync::SyncError`]; everything here is about
//! the plumbing around it (config, credentials, provider transport).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for findmyclass-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential store errors
    #[error("Credential store error: {0}")]
    Credential(#[from] CredentialError),

    /// Calendar provider errors
    #[error("Calendar provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Session file errors
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Credential store errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// OS keyring backend failure
    #[error("keyring: {0}")]
    Keyring(#[from] keyring::Error),

    /// Backend refused the operation for another reason
    #[error("{0}")]
    Backend(String),
}

/// Errors raised while talking to the calendar provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered with a non-success HTTP status
    #[error("Calendar API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider answered 2xx but the body carries an `error` object
    #[error("Calendar API error: {0}")]
    ErrorPayload(String),

    /// Provider kept paging past what one window can hold
    #[error("Calendar API paging error: {0}")]
    Paging(String),

    /// Body could not be decoded into events
    #[error("Failed to decode calendar response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint URL could not be built
    #[error("Invalid calendar endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
