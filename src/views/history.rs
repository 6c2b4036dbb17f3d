//! History page: past summaries and chat sessions

use crate::api::types::{ChatSession, SummaryRecord};
use crate::api::ApiClient;
use crate::app::{Navigator, Route};
use crate::error::Result;
use crate::views::inline_error;

/// Characters of a summary shown in the list
pub const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryTab {
    #[default]
    Chats,
    Summaries,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    pub tab: HistoryTab,
    summaries: Vec<SummaryRecord>,
    sessions: Vec<ChatSession>,
    error: Option<String>,
    loading: bool,
}

impl HistoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries(&self) -> &[SummaryRecord] {
        &self.summaries
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn switch_tab(&mut self, tab: HistoryTab) {
        self.tab = tab;
    }

    /// Fetch summaries and sessions concurrently
    ///
    /// Either failure leaves both lists as they were.
    pub async fn load(&mut self, api: &ApiClient) -> Result<()> {
        self.loading = true;
        let result = futures::try_join!(api.summary_history(), api.list_sessions());
        self.loading = false;

        match result {
            Ok((summaries, sessions)) => {
                tracing::debug!(
                    summaries = summaries.len(),
                    sessions = sessions.len(),
                    "History loaded"
                );
                self.summaries = summaries;
                self.sessions = sessions;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = inline_error(&e, "Could not load history");
                Err(e)
            }
        }
    }

    /// Delete a chat session after the user confirmed
    pub async fn delete_session(
        &mut self,
        api: &ApiClient,
        session_id: &str,
        confirmed: bool,
    ) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }
        match api.delete_session(session_id).await {
            Ok(()) => {
                self.sessions.retain(|s| s.session_id != session_id);
                Ok(true)
            }
            Err(e) => {
                self.error = inline_error(&e, "Could not delete the conversation");
                Err(e)
            }
        }
    }

    /// Hand a session to the chat page
    ///
    /// Returns the session id the chat view should select.
    pub fn open_session(&self, navigator: &Navigator, session_id: &str) -> String {
        navigator.navigate(Route::Chat);
        session_id.to_string()
    }

    pub async fn summary_detail(&mut self, api: &ApiClient, summary_id: i64) -> Result<SummaryRecord> {
        match api.summary_by_id(summary_id).await {
            Ok(record) => Ok(record),
            Err(e) => {
                self.error = inline_error(&e, "Could not load the summary");
                Err(e)
            }
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of a summary, with an ellipsis if cut
pub fn preview(summary: &str) -> String {
    let mut chars = summary.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
