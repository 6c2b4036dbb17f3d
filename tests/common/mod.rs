use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use synopsis::app::AppContext;
use synopsis::config::Config;
use synopsis::storage::{CredentialStore, MemoryStore};

pub const GOOD_TOKEN: &str = "good-token";

#[allow(dead_code)]
pub fn api_path(suffix: &str) -> String {
    format!("/api/v1{}", suffix)
}

#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/api/v1", server.uri());
    config.api.timeout_seconds = 5;
    config
}

#[allow(dead_code)]
pub fn user_json() -> Value {
    json!({
        "id": 7,
        "username": "alice",
        "email": "alice@example.com",
        "full_name": "Alice Example",
        "is_active": true,
        "created_at": "2024-05-01T10:00:00"
    })
}

#[allow(dead_code)]
pub fn session_json(id: &str, title: &str) -> Value {
    json!({
        "session_id": id,
        "title": title,
        "created_at": "2024-05-01T10:00:00",
        "updated_at": "2024-05-01T10:05:00",
        "message_count": 2
    })
}

/// `GET /auth/me` answers with the test user for the good token
#[allow(dead_code)]
pub async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(api_path("/auth/me")))
        .and(header("authorization", format!("Bearer {}", GOOD_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
}

/// Context restored from a stored token against the mock server
#[allow(dead_code)]
pub async fn signed_in_context(server: &MockServer) -> (AppContext, Arc<MemoryStore>) {
    mount_me(server).await;
    let store = Arc::new(MemoryStore::with_token(GOOD_TOKEN));
    let ctx = AppContext::init_with_store(config_for(server), store.clone() as Arc<dyn CredentialStore>)
        .await
        .expect("context should initialize");
    assert!(ctx.auth.is_authenticated(), "stored token should restore the session");
    (ctx, store)
}

#[allow(dead_code)]
pub fn temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let file_path = temp_dir.path().join(name);
    fs::write(&file_path, contents).expect("failed to write file");
    (temp_dir, file_path)
}
