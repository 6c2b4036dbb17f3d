//! End-to-end tests of the `synopsis` binary

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_path, mount_me, GOOD_TOKEN};

const NO_SERVER: &str = "http://127.0.0.1:9/api/v1";

/// Binary pointed at a throwaway credentials file
fn synopsis(creds: &TempDir, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("synopsis").unwrap();
    cmd.env("SYNOPSIS_STORAGE_BACKEND", "file")
        .env("SYNOPSIS_STORAGE_PATH", creds.path().join("credentials.json"))
        .env("SYNOPSIS_API_URL", api_url)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("SYNOPSIS_PASSWORD")
        .arg("--config")
        .arg(creds.path().join("missing.yaml"));
    cmd
}

#[test]
fn test_help_lists_pages() {
    let creds = TempDir::new().unwrap();
    synopsis(&creds, NO_SERVER)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summarize"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_protected_command_requires_sign_in() {
    let creds = TempDir::new().unwrap();
    synopsis(&creds, NO_SERVER)
        .args(["summarize", "--text", "Something worth summarizing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_home_offers_get_started() {
    let creds = TempDir::new().unwrap();
    synopsis(&creds, NO_SERVER)
        .arg("home")
        .assert()
        .success()
        .stdout(predicate::str::contains("Get started"))
        .stdout(predicate::str::contains("synopsis register"));
}

#[test]
fn test_logout_without_session_succeeds() {
    let creds = TempDir::new().unwrap();
    synopsis(&creds, NO_SERVER)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));
}

#[test]
fn test_unknown_length_is_rejected() {
    let creds = TempDir::new().unwrap();
    synopsis(&creds, NO_SERVER)
        .args(["summarize", "--text", "abc", "--length", "tiny"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tiny"));
}

#[test]
fn test_summarize_needs_an_input() {
    let creds = TempDir::new().unwrap();
    synopsis(&creds, NO_SERVER)
        .arg("summarize")
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session_for_next_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/login-json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": GOOD_TOKEN,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server).await;

    let creds = TempDir::new().unwrap();
    let api_url = format!("{}/api/v1", server.uri());

    synopsis(&creds, &api_url)
        .args(["login", "-u", "alice", "--password", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as"));

    assert!(creds.path().join("credentials.json").exists());

    synopsis(&creds, &api_url)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice@example.com"));

    synopsis(&creds, &api_url).arg("logout").assert().success();
    assert!(!creds.path().join("credentials.json").exists());
}
