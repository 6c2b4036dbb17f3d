//! Client-side credential storage
//!
//! The only durable client state is the bearer token and a cached copy of
//! the signed-in user's profile. A missing token means "logged out".
//!
//! Three backends implement [`CredentialStore`]:
//!
//! - [`KeyringStore`] -- OS keyring (default)
//! - [`FileStore`] -- JSON file in the user's data directory
//! - [`MemoryStore`] -- process-local, for tests and ephemeral runs

use crate::api::types::User;
use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Result, SynopsisError};
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

pub mod keyring;
pub use self::keyring::KeyringStore;

/// Persistence for the session token and cached user
pub trait CredentialStore: Send + Sync {
    /// Stored bearer token, if any
    fn token(&self) -> Result<Option<String>>;

    fn set_token(&self, token: &str) -> Result<()>;

    /// Cached profile; not authoritative
    fn user(&self) -> Result<Option<User>>;

    fn set_user(&self, user: &User) -> Result<()>;

    /// Remove token and user. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// Build the store selected by configuration
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn CredentialStore>> {
    match config.backend {
        StorageBackend::Keyring => Ok(Arc::new(KeyringStore::new())),
        StorageBackend::File => {
            let store = match &config.path {
                Some(path) => FileStore::new_with_path(path.clone())?,
                None => FileStore::new()?,
            };
            Ok(Arc::new(store))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// Credentials kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store under the platform data directory (`credentials.json`)
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "synopsis", "synopsis")
            .ok_or_else(|| SynopsisError::Storage("Could not determine data directory".into()))?;
        Self::new_with_path(proj_dirs.data_dir().join("credentials.json"))
    }

    /// Store at an explicit path; parent directories are created.
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create credentials directory")
                .map_err(|e| SynopsisError::Storage(e.to_string()))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(StoredCredentials::default());
        }
        match serde_json::from_str(&contents) {
            Ok(creds) => Ok(creds),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable credentials file: {}", e);
                Ok(StoredCredentials::default())
            }
        }
    }

    /// Writes with owner-only permissions from the moment the file exists
    fn write(&self, creds: &StoredCredentials) -> Result<()> {
        use std::io::Write;

        let json = serde_json::to_string_pretty(creds)?;
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);
            let mut file = options.open(&self.path)?;
            // `mode` only applies when the file is created.
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
            file.write_all(json.as_bytes())?;
        }
        #[cfg(not(unix))]
        {
            let mut file = options.open(&self.path)?;
            file.write_all(json.as_bytes())?;
        }
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.read()?.token.filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let mut creds = self.read()?;
        creds.token = Some(token.to_string());
        self.write(&creds)
    }

    fn user(&self) -> Result<Option<User>> {
        Ok(self.read()?.user)
    }

    fn set_user(&self, user: &User) -> Result<()> {
        let mut creds = self.read()?;
        creds.user = Some(user.clone());
        self.write(&creds)
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory credentials
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoredCredentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut creds) = store.inner.write() {
            creds.token = Some(token.to_string());
        }
        store
    }

    fn lock_err() -> SynopsisError {
        SynopsisError::Storage("credential store lock poisoned".to_string())
    }
}

impl CredentialStore for MemoryStore {
    fn token(&self) -> Result<Option<String>> {
        let creds = self.inner.read().map_err(|_| Self::lock_err())?;
        Ok(creds.token.clone().filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let mut creds = self.inner.write().map_err(|_| Self::lock_err())?;
        creds.token = Some(token.to_string());
        Ok(())
    }

    fn user(&self) -> Result<Option<User>> {
        let creds = self.inner.read().map_err(|_| Self::lock_err())?;
        Ok(creds.user.clone())
    }

    fn set_user(&self, user: &User) -> Result<()> {
        let mut creds = self.inner.write().map_err(|_| Self::lock_err())?;
        creds.user = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut creds = self.inner.write().map_err(|_| Self::lock_err())?;
        *creds = StoredCredentials::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: Some("Alice Example".into()),
            is_active: Some(true),
            created_at: None,
        }
    }

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let store = MemoryStore::new();
        assert!(store.token().unwrap().is_none());

        store.set_token("tok").unwrap();
        store.set_user(&sample_user()).unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(store.user().unwrap().unwrap().username, "alice");

        store.clear().unwrap();
        assert!(store.token().unwrap().is_none());
        assert!(store.user().unwrap().is_none());
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let store = MemoryStore::with_token("");
        assert!(store.token().unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new_with_path(&path).unwrap();
        store.set_token("file-token").unwrap();
        store.set_user(&sample_user()).unwrap();

        let reopened = FileStore::new_with_path(&path).unwrap();
        assert_eq!(reopened.token().unwrap().as_deref(), Some("file-token"));
        assert_eq!(reopened.user().unwrap(), Some(sample_user()));
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new_with_path(dir.path().join("credentials.json")).unwrap();
        store.clear().unwrap();
        store.set_token("t").unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.token().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileStore::new_with_path(&path).unwrap();
        store.set_token("secret").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // An existing readable file is tightened on the next write.
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        store.set_token("rotated").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.token().unwrap().as_deref(), Some("rotated"));
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new_with_path(&path).unwrap();
        assert!(store.token().unwrap().is_none());
    }

    #[test]
    fn test_open_store_file_backend() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().join("creds.json")),
        };
        let store = open_store(&config).unwrap();
        store.set_token("abc").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("abc"));
    }
}
