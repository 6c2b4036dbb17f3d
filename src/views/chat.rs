//! Chat page: session list, active conversation and message composer
//!
//! Sending is optimistic. The user's message is appended as a pending
//! [`ChatEntry`] before the request goes out, and the request's result is
//! folded back in through [`ChatView::apply`]:
//!
//! - [`SendOutcome::Delivered`] settles the entry, appends the assistant
//!   reply and bumps the session's activity time.
//! - [`SendOutcome::Failed`] removes exactly that pending entry and shows
//!   the error.

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::api::types::{ChatMessage, ChatSession, CreateSessionRequest, SendMessageRequest};
use crate::api::ApiClient;
use crate::attachment::{Attachment, MAX_ATTACHMENT_BYTES};
use crate::config::Config;
use crate::error::{self, Result, SynopsisError};
use crate::views::inline_error;

const SEND_FAILED: &str = "An error occurred while sending the message";

/// A message as displayed, with a local id for reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub id: Uuid,
    pub message: ChatMessage,
    /// Sent but not yet answered
    pub pending: bool,
}

impl ChatEntry {
    pub fn settled(message: ChatMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            pending: false,
        }
    }
}

/// An in-flight send, produced by [`ChatView::begin_send`]
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub id: Uuid,
    pub session_id: String,
    pub text: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Delivered { reply: String },
    /// `message` is `None` when the failure was a 401
    Failed { message: Option<String> },
}

#[derive(Debug, Clone)]
pub struct ChatView {
    sessions: Vec<ChatSession>,
    active: Option<String>,
    entries: Vec<ChatEntry>,
    pub input: String,
    attachment: Option<Attachment>,
    error: Option<String>,
    loading: bool,
    default_title: String,
    max_attachment_bytes: u64,
}

impl ChatView {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
            entries: Vec::new(),
            input: String::new(),
            attachment: None,
            error: None,
            loading: false,
            default_title: config.chat.default_session_title.clone(),
            max_attachment_bytes: config.chat.max_attachment_bytes.min(MAX_ATTACHMENT_BYTES),
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        let id = self.active.as_deref()?;
        self.sessions.iter().find(|s| s.session_id == id)
    }

    /// Resolve a session id or unique id prefix against the loaded list
    pub fn find_session(&self, query: &str) -> Result<String> {
        if let Some(exact) = self.sessions.iter().find(|s| s.session_id == query) {
            return Ok(exact.session_id.clone());
        }
        let matches: Vec<&ChatSession> = self
            .sessions
            .iter()
            .filter(|s| s.session_id.starts_with(query))
            .collect();
        match matches.as_slice() {
            [only] => Ok(only.session_id.clone()),
            [] => Err(SynopsisError::Validation(format!("Conversation {} not found", query)).into()),
            _ => Err(SynopsisError::Validation(format!(
                "Conversation id {} is ambiguous ({} matches)",
                query,
                matches.len()
            ))
            .into()),
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn fail<T>(&mut self, err: anyhow::Error, fallback: &str) -> Result<T> {
        self.error = inline_error(&err, fallback);
        Err(err)
    }

    /// Fetch the session list
    ///
    /// Creates a first session when the user has none; otherwise selects the
    /// first one unless the active session is still listed.
    pub async fn load_sessions(&mut self, api: &ApiClient) -> Result<()> {
        let sessions = match api.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => return self.fail(e, "Could not load conversations"),
        };
        tracing::debug!(count = sessions.len(), "Sessions loaded");
        self.sessions = sessions;

        if self.sessions.is_empty() {
            self.create_session(api, None).await?;
            return Ok(());
        }

        let still_listed = self
            .active
            .as_deref()
            .map(|id| self.sessions.iter().any(|s| s.session_id == id))
            .unwrap_or(false);
        if !still_listed {
            let first = self.sessions[0].session_id.clone();
            self.select_session(api, &first).await?;
        }
        Ok(())
    }

    /// Create a session, put it first in the list and make it active
    pub async fn create_session(&mut self, api: &ApiClient, title: Option<&str>) -> Result<()> {
        let request = CreateSessionRequest {
            title: title.unwrap_or(self.default_title.as_str()).to_string(),
        };
        let session = match api.create_session(&request).await {
            Ok(session) => session,
            Err(e) => return self.fail(e, "Could not create a new conversation"),
        };
        tracing::info!(session = %session.session_id, "Session created");
        self.active = Some(session.session_id.clone());
        self.sessions.insert(0, session);
        self.entries.clear();
        Ok(())
    }

    /// Make a listed session active and load its messages
    pub async fn select_session(&mut self, api: &ApiClient, session_id: &str) -> Result<()> {
        if !self.sessions.iter().any(|s| s.session_id == session_id) {
            return self.fail(
                SynopsisError::Validation(format!("Conversation {} not found", session_id)).into(),
                "Conversation not found",
            );
        }
        self.active = Some(session_id.to_string());
        self.error = None;
        self.load_messages(api, session_id).await
    }

    /// Replace the displayed messages with the session's history
    ///
    /// A failed load shows an empty conversation; only a 401 is returned as
    /// an error.
    pub async fn load_messages(&mut self, api: &ApiClient, session_id: &str) -> Result<()> {
        match api.session_history(session_id).await {
            Ok(history) => {
                self.entries = history
                    .messages
                    .into_iter()
                    .map(ChatEntry::settled)
                    .collect();
                Ok(())
            }
            Err(e) if error::is_unauthorized(&e) => {
                self.entries.clear();
                Err(e)
            }
            Err(e) => {
                tracing::warn!(session = %session_id, "Failed to load messages: {}", e);
                self.entries.clear();
                Ok(())
            }
        }
    }

    /// Delete a session after the user confirmed
    ///
    /// Returns `false` without a request when not confirmed. Deleting the
    /// active session activates the first remaining one, or creates a new
    /// session when none remain.
    pub async fn delete_session(
        &mut self,
        api: &ApiClient,
        session_id: &str,
        confirmed: bool,
    ) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }
        if let Err(e) = api.delete_session(session_id).await {
            return self.fail(e, "Could not delete the conversation");
        }
        tracing::info!(session = %session_id, "Session deleted");
        self.sessions.retain(|s| s.session_id != session_id);

        if self.active.as_deref() == Some(session_id) {
            self.active = None;
            self.entries.clear();
            match self.sessions.first().map(|s| s.session_id.clone()) {
                Some(next) => self.select_session(api, &next).await?,
                None => self.create_session(api, None).await?,
            }
        }
        Ok(true)
    }

    /// Remove every message from the active session
    pub async fn clear_session(&mut self, api: &ApiClient) -> Result<()> {
        let Some(session_id) = self.active.clone() else {
            return Ok(());
        };
        if let Err(e) = api.clear_session(&session_id).await {
            return self.fail(e, "Could not clear the conversation");
        }
        self.entries.clear();
        if let Some(session) = self.sessions.iter_mut().find(|s| s.session_id == session_id) {
            session.message_count = Some(0);
            session.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Validate and stage a document for the next message
    pub fn attach_file(&mut self, path: &Path) -> Result<()> {
        match Attachment::from_path(path, self.max_attachment_bytes) {
            Ok(attachment) => {
                tracing::debug!(file = %attachment.file_name, "Attachment staged");
                self.attachment = Some(attachment);
                self.error = None;
                Ok(())
            }
            Err(e) => self.fail(e, "Could not read the selected file"),
        }
    }

    pub fn remove_attachment(&mut self) {
        self.attachment = None;
    }

    /// Append the optimistic user message and take the composer contents
    ///
    /// Returns `None` when there is nothing to send or no active session.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        let text = self.input.trim().to_string();
        if text.is_empty() && self.attachment.is_none() {
            return None;
        }
        let session_id = self.active.clone()?;

        let attachment = self.attachment.take();
        self.input.clear();
        self.error = None;
        self.loading = true;

        let id = Uuid::new_v4();
        let file_name = attachment.as_ref().map(|a| a.file_name.clone());
        self.entries.push(ChatEntry {
            id,
            message: ChatMessage::user(text.clone(), file_name),
            pending: true,
        });

        Some(PendingSend {
            id,
            session_id,
            text,
            attachment,
        })
    }

    /// Fold a send result into the conversation
    pub fn apply(&mut self, pending: &PendingSend, outcome: SendOutcome) {
        self.loading = false;
        match outcome {
            SendOutcome::Delivered { reply } => {
                if let Some(entry) = self.entries.iter_mut().find(|e| e.id == pending.id) {
                    entry.pending = false;
                }
                if self.active.as_deref() == Some(pending.session_id.as_str()) {
                    self.entries
                        .push(ChatEntry::settled(ChatMessage::assistant(reply)));
                }
                if let Some(session) = self
                    .sessions
                    .iter_mut()
                    .find(|s| s.session_id == pending.session_id)
                {
                    session.updated_at = Some(Utc::now());
                    session.message_count = Some(session.message_count.unwrap_or(0) + 2);
                }
            }
            SendOutcome::Failed { message } => {
                self.entries.retain(|e| e.id != pending.id);
                self.error = message;
            }
        }
    }

    /// Send the composer contents to the active session
    ///
    /// Blank text without an attachment is a no-op (`Ok(None)`). Without an
    /// active session one is created first and the message is sent to it.
    pub async fn send_message(&mut self, api: &ApiClient) -> Result<Option<String>> {
        if self.input.trim().is_empty() && self.attachment.is_none() {
            return Ok(None);
        }
        if self.active.is_none() {
            self.create_session(api, None).await?;
        }
        let Some(pending) = self.begin_send() else {
            return Ok(None);
        };

        let result = match &pending.attachment {
            Some(file) => {
                api.send_message_with_file(&pending.session_id, &pending.text, file)
                    .await
            }
            None => {
                let request = SendMessageRequest {
                    message: pending.text.clone(),
                };
                api.send_message(&pending.session_id, &request).await
            }
        };

        match result {
            Ok(response) => {
                let reply = response.assistant_response;
                self.apply(
                    &pending,
                    SendOutcome::Delivered {
                        reply: reply.clone(),
                    },
                );
                Ok(Some(reply))
            }
            Err(e) => {
                tracing::warn!(session = %pending.session_id, "Send failed: {}", e);
                self.apply(
                    &pending,
                    SendOutcome::Failed {
                        message: inline_error(&e, SEND_FAILED),
                    },
                );
                Err(e)
            }
        }
    }
}
