//! Test utilities for Synopsis
//!
//! Fixtures shared by the unit tests: temporary files, an API client that
//! never reaches a server, and sample users and sessions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::api::types::{ChatSession, User};
use crate::api::ApiClient;
use crate::config::Config;
use crate::storage::{CredentialStore, MemoryStore};

/// Discard-port address; connections fail immediately
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9/api/v1";

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a file under `dir` and return its path
pub fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error's display contains `expected`
pub fn assert_error_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!(
            "Expected error containing '{}' but got Ok({:?})",
            expected, value
        ),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Client whose requests always fail with a transport error
pub fn offline_api(store: Arc<dyn CredentialStore>) -> ApiClient {
    ApiClient::new(UNREACHABLE_API, Duration::from_secs(1), store)
        .expect("Failed to build offline client")
}

/// Offline client with a stored token, so requests are attempted
pub fn signed_in_offline_api() -> ApiClient {
    offline_api(Arc::new(MemoryStore::with_token("test-token")))
}

pub fn test_config() -> Config {
    Config::default()
}

pub fn test_user() -> User {
    User {
        id: 1,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        full_name: Some("Alice Example".to_string()),
        is_active: Some(true),
        created_at: None,
    }
}

pub fn test_session(id: &str) -> ChatSession {
    ChatSession {
        session_id: id.to_string(),
        title: Some(format!("Session {}", id)),
        created_at: None,
        updated_at: None,
        message_count: Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynopsisError;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", b"content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: anyhow::Result<()> =
            Err(SynopsisError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_is_valid() {
        assert!(test_config().validate().is_ok());
    }
}
