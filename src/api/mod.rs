//! REST client for the summarization and chat backend
//!
//! [`ApiClient`] exposes one async method per `/api/v1` endpoint. Every
//! request carries `Authorization: Bearer <token>` when the credential store
//! holds a token.
//!
//! # Response handling
//!
//! All responses pass through [`ApiClient::check_response`]:
//!
//! - `2xx` -- returned to the caller.
//! - `401 Unauthorized` -- stored credentials are cleared, the registered
//!   session-expired hook fires, and `SynopsisError::Unauthorized` is
//!   returned. This happens regardless of which endpoint or view issued the
//!   request.
//! - anything else -- `SynopsisError::Api` carrying the server's `detail`
//!   message.
//!
//! No retries are attempted.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::attachment::Attachment;
use crate::config::ApiConfig;
use crate::error::{Result, SynopsisError};
use crate::storage::CredentialStore;

pub mod types;

use types::{
    ChatSession, CreateSessionRequest, ErrorBody, LegacyChatRequest, LegacyChatResponse,
    LoginRequest, RegisterRequest, SendMessageRequest, SendMessageResponse, SessionHistory,
    SummaryRecord, SummaryResult, TextSummarizeRequest, TokenResponse, UrlSummarizeRequest, User,
    VerifyResponse,
};

/// Callback fired after a 401 has cleared the stored credentials
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP client for the `/api/v1` backend
///
/// Cloning is cheap; clones share the connection pool, the credential store
/// and the session-expired hook.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use synopsis::api::ApiClient;
/// use synopsis::storage::MemoryStore;
///
/// # async fn example() -> synopsis::error::Result<()> {
/// let api = ApiClient::new(
///     "http://localhost:8000/api/v1",
///     Duration::from_secs(30),
///     Arc::new(MemoryStore::new()),
/// )?;
/// let sessions = api.list_sessions().await?;
/// println!("{} sessions", sessions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    session_expired: Arc<RwLock<Option<SessionExpiredHook>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Construct a client rooted at `base_url` (e.g. `http://host/api/v1`)
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::Config`] if the URL does not parse and
    /// [`SynopsisError::Http`] if the underlying client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        url::Url::parse(base_url).map_err(|e| {
            SynopsisError::Config(format!("Invalid API base URL {}: {}", base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("synopsis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SynopsisError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            session_expired: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(config: &ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
            store,
        )
    }

    /// Register the callback fired when any request comes back 401
    ///
    /// Replaces a previously registered hook.
    pub fn on_session_expired(&self, hook: SessionExpiredHook) {
        match self.session_expired.write() {
            Ok(mut slot) => *slot = Some(hook),
            Err(poisoned) => *poisoned.into_inner() = Some(hook),
        }
    }

    /// Drop the registered hook (application teardown)
    pub fn clear_session_expired_hook(&self) {
        match self.session_expired.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let mut req = self.http.request(method, self.endpoint(path));
        if let Some(token) = self.store.token()? {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn execute(&self, req: RequestBuilder, path: &str) -> Result<Response> {
        let response = req.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", path, e);
            SynopsisError::Transport(format!("Request to {} failed: {}", path, e))
        })?;
        self.check_response(response).await
    }

    /// Response interceptor shared by every endpoint
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %response.url(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Server rejected credentials: {}", message);
            self.expire_session();
            return Err(SynopsisError::Unauthorized(message).into());
        }

        if status.is_server_error() {
            tracing::error!("Server returned error {}: {}", status, message);
        } else {
            tracing::debug!("Server returned error {}: {}", status, message);
        }

        Err(SynopsisError::Api {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    fn expire_session(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored credentials: {}", e);
        }
        // Clone out of the slot so the hook may re-register or clear it.
        let hook = match self.session_expired.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", path, e);
            SynopsisError::Transport(format!("Failed to parse response from {}: {}", path, e))
                .into()
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!("GET {}", path);
        let req = self.request(Method::GET, path)?;
        let response = self.execute(req, path).await?;
        Self::decode(response, path).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {}", path);
        let req = self.request(Method::POST, path)?.json(body);
        let response = self.execute(req, path).await?;
        Self::decode(response, path).await
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        query: &[(&str, &str)],
    ) -> Result<T> {
        tracing::debug!("POST {} (multipart)", path);
        let req = self
            .request(Method::POST, path)?
            .query(query)
            .multipart(form);
        let response = self.execute(req, path).await?;
        Self::decode(response, path).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        tracing::debug!("{} {}", method, path);
        let req = self.request(method, path)?;
        self.execute(req, path).await?;
        Ok(())
    }

    // -- auth -------------------------------------------------------------

    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        self.post_json("/auth/register", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse> {
        self.post_json("/auth/login-json", request).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get_json("/auth/me").await
    }

    pub async fn verify_token(&self) -> Result<VerifyResponse> {
        self.get_json("/auth/verify").await
    }

    // -- summarize --------------------------------------------------------

    pub async fn summarize_text(&self, request: &TextSummarizeRequest) -> Result<SummaryResult> {
        self.post_json("/summarize/text", request).await
    }

    pub async fn summarize_url(&self, request: &UrlSummarizeRequest) -> Result<SummaryResult> {
        self.post_json("/summarize/url", request).await
    }

    /// Upload a document as the multipart `file` field
    pub async fn summarize_file(&self, file: &Attachment, length: &str) -> Result<SummaryResult> {
        let form = Form::new().part("file", file_part(file)?);
        self.post_multipart("/summarize/file", form, &[("length", length)])
            .await
    }

    pub async fn summary_history(&self) -> Result<Vec<SummaryRecord>> {
        self.get_json("/summarize/history").await
    }

    pub async fn summary_by_id(&self, summary_id: i64) -> Result<SummaryRecord> {
        self.get_json(&format!("/summarize/history/{}", summary_id))
            .await
    }

    // -- chat sessions ----------------------------------------------------

    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        self.get_json("/chat/sessions").await
    }

    pub async fn create_session(&self, request: &CreateSessionRequest) -> Result<ChatSession> {
        self.post_json("/chat/sessions", request).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/chat/sessions/{}", session_id))
            .await
    }

    pub async fn session_history(&self, session_id: &str) -> Result<SessionHistory> {
        self.get_json(&format!("/chat/sessions/{}/history", session_id))
            .await
    }

    pub async fn send_message(
        &self,
        session_id: &str,
        request: &SendMessageRequest,
    ) -> Result<SendMessageResponse> {
        self.post_json(&format!("/chat/sessions/{}/messages", session_id), request)
            .await
    }

    /// Send a message with one attached document (multipart `message` + `file`)
    pub async fn send_message_with_file(
        &self,
        session_id: &str,
        message: &str,
        file: &Attachment,
    ) -> Result<SendMessageResponse> {
        let form = Form::new()
            .text("message", message.to_string())
            .part("file", file_part(file)?);
        self.post_multipart(
            &format!("/chat/sessions/{}/messages/file", session_id),
            form,
            &[],
        )
        .await
    }

    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        self.send_empty(Method::POST, &format!("/chat/sessions/{}/clear", session_id))
            .await
    }

    /// Legacy single-turn chat without a session
    pub async fn legacy_chat(&self, request: &LegacyChatRequest) -> Result<LegacyChatResponse> {
        self.post_json("/chat", request).await
    }
}

fn file_part(file: &Attachment) -> Result<Part> {
    let part = Part::stream_with_length(file.content.clone(), file.size())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)
        .map_err(SynopsisError::Http)?;
    Ok(part)
}

/// Best-effort extraction of the server's error message
async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    match response.text().await {
        Ok(body) if !body.trim().is_empty() => serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(fallback),
        _ => fallback,
    }
}
