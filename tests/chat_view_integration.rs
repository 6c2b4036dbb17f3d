mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use synopsis::api::types::Role;
use synopsis::app::{Route, SESSION_EXPIRED_NOTICE};
use synopsis::error;
use synopsis::storage::CredentialStore;
use synopsis::views::ChatView;

use common::{api_path, session_json, signed_in_context, temp_file};

async fn mount_sessions(server: &MockServer, sessions: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(api_path("/chat/sessions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sessions))
        .mount(server)
        .await;
}

async fn mount_history(server: &MockServer, id: &str, messages: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(api_path(&format!("/chat/sessions/{}/history", id))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": id,
            "messages": messages
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_first_visit_creates_a_session() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions")))
        .and(body_json(json!({"title": "New conversation"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("fresh", "New conversation")))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();

    assert_eq!(view.sessions().len(), 1);
    assert_eq!(view.active_session_id(), Some("fresh"));
    assert!(view.entries().is_empty());
}

#[tokio::test]
async fn test_load_selects_first_session_and_its_messages() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First"), session_json("b", "Second")])).await;
    mount_history(
        &server,
        "a",
        json!([
            {"role": "user", "content": "Hello"},
            {"role": "assistant", "content": "Hi there"}
        ]),
    )
    .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();

    assert_eq!(view.active_session_id(), Some("a"));
    let entries = view.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message.role, Role::User);
    assert_eq!(entries[1].message.content, "Hi there");
    assert!(entries.iter().all(|e| !e.pending));
}

#[tokio::test]
async fn test_send_appends_reply_and_updates_session() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/messages")))
        .and(body_json(json!({"message": "What is Rust?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assistant_response": "A systems language.",
            "session_id": "a"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    view.input = "  What is Rust?  ".into();
    let reply = view.send_message(&ctx.api).await.unwrap();

    assert_eq!(reply.as_deref(), Some("A systems language."));
    assert!(view.input.is_empty());
    assert_eq!(view.entries().len(), 2);
    assert_eq!(view.entries()[0].message.content, "What is Rust?");
    assert!(!view.entries()[0].pending);
    assert_eq!(view.entries()[1].message.role, Role::Assistant);
    assert_eq!(view.sessions()[0].message_count, Some(4));
}

#[tokio::test]
async fn test_failed_send_removes_optimistic_message() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/messages")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Model unavailable"})))
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    view.input = "Hello".into();
    assert!(view.send_message(&ctx.api).await.is_err());

    assert!(view.entries().is_empty());
    assert_eq!(view.error(), Some("Model unavailable"));
    assert!(!view.is_loading());
}

#[tokio::test]
async fn test_blank_send_is_a_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/messages")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.input = "   ".into();
    assert_eq!(view.send_message(&ctx.api).await.unwrap(), None);
    assert!(view.entries().is_empty());
}

#[tokio::test]
async fn test_send_without_session_creates_one_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("new", "New conversation")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/new/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assistant_response": "Hello!",
            "session_id": "new"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.input = "Hi".into();
    let reply = view.send_message(&ctx.api).await.unwrap();

    assert_eq!(reply.as_deref(), Some("Hello!"));
    assert_eq!(view.active_session_id(), Some("new"));
}

#[tokio::test]
async fn test_delete_active_session_selects_next() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First"), session_json("b", "Second")])).await;
    mount_history(&server, "a", json!([])).await;
    mount_history(&server, "b", json!([{"role": "user", "content": "Earlier"}])).await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/chat/sessions/a")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    assert!(view.delete_session(&ctx.api, "a", true).await.unwrap());

    assert_eq!(view.sessions().len(), 1);
    assert_eq!(view.active_session_id(), Some("b"));
    assert_eq!(view.entries()[0].message.content, "Earlier");
}

#[tokio::test]
async fn test_delete_last_session_creates_replacement() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("only", "Only")])).await;
    mount_history(&server, "only", json!([])).await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/chat/sessions/only")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("replacement", "New conversation")))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    view.delete_session(&ctx.api, "only", true).await.unwrap();

    assert_eq!(view.active_session_id(), Some("replacement"));
    assert_eq!(view.sessions().len(), 1);
}

#[tokio::test]
async fn test_unconfirmed_delete_issues_no_request() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([])).await;
    Mock::given(method("DELETE"))
        .and(path(api_path("/chat/sessions/a")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    assert!(!view.delete_session(&ctx.api, "a", false).await.unwrap());
    assert_eq!(view.sessions().len(), 1);
}

#[tokio::test]
async fn test_rejected_attachment_never_uploads() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/messages/file")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let (_dir, image) = temp_file("photo.png", b"\x89PNG");
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();

    assert!(view.attach_file(&image).is_err());
    assert!(view.attachment().is_none());
    assert!(view.error().is_some());
}

#[tokio::test]
async fn test_attachment_sent_with_message() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/messages/file")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assistant_response": "The notes cover Q3.",
            "session_id": "a"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let (_dir, notes) = temp_file("notes.txt", b"Q3 planning notes");
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    view.attach_file(&notes).unwrap();
    view.input = "Summarize this".into();
    view.send_message(&ctx.api).await.unwrap();

    assert!(view.attachment().is_none());
    assert_eq!(view.entries()[0].message.file.as_deref(), Some("notes.txt"));
}

#[tokio::test]
async fn test_clear_session_empties_messages() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([{"role": "user", "content": "Old"}])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/clear")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "cleared"})))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _store) = signed_in_context(&server).await;
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    assert_eq!(view.entries().len(), 1);

    view.clear_session(&ctx.api).await.unwrap();
    assert!(view.entries().is_empty());
    assert_eq!(view.sessions()[0].message_count, Some(0));
}

#[tokio::test]
async fn test_401_on_send_rolls_back_and_redirects_to_login() {
    let server = MockServer::start().await;
    mount_sessions(&server, json!([session_json("a", "First")])).await;
    mount_history(&server, "a", json!([])).await;
    Mock::given(method("POST"))
        .and(path(api_path("/chat/sessions/a/messages")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, store) = signed_in_context(&server).await;
    assert_eq!(ctx.enter(Route::Chat), Route::Chat);
    let mut view = ChatView::new(&ctx.config);
    view.load_sessions(&ctx.api).await.unwrap();
    view.input = "Are you there?".into();

    let err = view.send_message(&ctx.api).await.unwrap_err();
    assert!(error::is_unauthorized(&err));
    assert!(view.entries().is_empty());
    assert!(view.error().is_none());
    assert!(!view.is_loading());
    assert!(store.token().unwrap().is_none());
    assert!(!ctx.auth.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Login);
    assert_eq!(ctx.navigator.take_notice().as_deref(), Some(SESSION_EXPIRED_NOTICE));
}
