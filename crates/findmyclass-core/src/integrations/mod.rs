pub mod google;
pub mod traits;

pub use google::{ErrorPayloadPolicy, GoogleCalendarProvider};
pub use keyring_store::{KeyringStore, MemoryStore};
pub use traits::{CalendarProvider, CredentialStore, FetchWindow, SessionState, PROVIDER_TOKEN_KEY};

/// Credential storage backends.
pub mod keyring_store {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::traits::CredentialStore;
    use crate::error::CredentialError;

    const SERVICE: &str = "findmyclass";

    /// Environment variable overriding the keyring service name.
    pub const SERVICE_ENV: &str = "FINDMYCLASS_KEYRING_SERVICE";

    /// Thin wrapper around the OS keyring.
    #[derive(Debug, Clone)]
    pub struct KeyringStore {
        service: String,
    }

    impl Default for KeyringStore {
        /// Service from `FINDMYCLASS_KEYRING_SERVICE`, else `findmyclass`.
        fn default() -> Self {
            Self::with_service(service_name(std::env::var(SERVICE_ENV).ok()))
        }
    }

    fn service_name(from_env: Option<String>) -> String {
        from_env
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| SERVICE.to_string())
    }

    impl KeyringStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_service(service: impl Into<String>) -> Self {
            Self {
                service: service.into(),
            }
        }

        pub fn service(&self) -> &str {
            &self.service
        }

        fn entry(&self, key: &str) -> Result<keyring::Entry, CredentialError> {
            Ok(keyring::Entry::new(&self.service, key)?)
        }
    }

    impl CredentialStore for KeyringStore {
        fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
            match self.entry(key)?.get_password() {
                Ok(pw) => Ok(Some(pw)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
            self.entry(key)?.set_password(value)?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), CredentialError> {
            match self.entry(key)?.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }

    /// In-process store, for tests and headless runs.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::default();
            if let Ok(mut map) = store.entries.lock() {
                map.insert(key.to_string(), value.to_string());
            }
            store
        }
    }

    impl CredentialStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
            let map = self
                .entries
                .lock()
                .map_err(|e| CredentialError::Backend(e.to_string()))?;
            Ok(map.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
            let mut map = self
                .entries
                .lock()
                .map_err(|e| CredentialError::Backend(e.to_string()))?;
            map.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), CredentialError> {
            let mut map = self
                .entries
                .lock()
                .map_err(|e| CredentialError::Backend(e.to_string()))?;
            map.remove(key);
            Ok(())
        }
    }

}
