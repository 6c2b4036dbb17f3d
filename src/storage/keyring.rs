//! Credential persistence via the OS keyring
//!
//! The token and the cached user are stored as two entries under the same
//! service name (Keychain on macOS, Secret Service on Linux, Windows
//! Credential Manager on Windows). The user profile is serialized to JSON.
//! [`KeyringStore`] holds only the service name; the keyring itself is the
//! state.

use crate::api::types::User;
use crate::error::{Result, SynopsisError};
use crate::storage::CredentialStore;

const DEFAULT_SERVICE: &str = "synopsis";
const TOKEN_ACCOUNT: &str = "access-token";
const USER_ACCOUNT: &str = "user";

/// Namespaced accessor for the OS keyring
///
/// # Examples
///
/// ```no_run
/// use synopsis::storage::{CredentialStore, KeyringStore};
///
/// let store = KeyringStore::new();
/// store.set_token("my_token").unwrap();
/// assert_eq!(store.token().unwrap().as_deref(), Some("my_token"));
/// ```
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Use a different service name, e.g. one per backend deployment
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, account: &str) -> Result<::keyring::Entry> {
        ::keyring::Entry::new(&self.service, account).map_err(|e| SynopsisError::Keyring(e).into())
    }

    fn read(&self, account: &str) -> Result<Option<String>> {
        match self.entry(account)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SynopsisError::Keyring(e).into()),
        }
    }

    fn delete(&self, account: &str) -> Result<()> {
        match self.entry(account)?.delete_password() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SynopsisError::Keyring(e).into()),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.read(TOKEN_ACCOUNT)?.filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.entry(TOKEN_ACCOUNT)?
            .set_password(token)
            .map_err(SynopsisError::Keyring)?;
        Ok(())
    }

    fn user(&self) -> Result<Option<User>> {
        match self.read(USER_ACCOUNT)? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(user) => Ok(Some(user)),
                Err(e) => {
                    tracing::warn!("Discarding unreadable cached user: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn set_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.entry(USER_ACCOUNT)?
            .set_password(&json)
            .map_err(SynopsisError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.delete(TOKEN_ACCOUNT)?;
        self.delete(USER_ACCOUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        assert_eq!(KeyringStore::new().service(), "synopsis");
        assert_eq!(KeyringStore::with_service("synopsis-staging").service(), "synopsis-staging");
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_roundtrip() {
        let store = KeyringStore::with_service("synopsis-test");
        store.set_token("keyring-token").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("keyring-token"));
        store.clear().unwrap();
        assert!(store.token().unwrap().is_none());
    }
}
