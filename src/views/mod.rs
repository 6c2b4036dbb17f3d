//! Page view models
//!
//! Each view owns its local form and request state and is driven by the CLI
//! (or any other front end). Views never navigate on their own except where
//! a page flow demands it (registration success); a 401 is handled by the
//! API client's session-expired hook, not here.

pub mod chat;
pub mod forms;
pub mod history;
pub mod landing;
pub mod summarize;

pub use chat::{ChatEntry, ChatView, PendingSend, SendOutcome};
pub use forms::{LoginForm, RegisterForm};
pub use history::{HistoryTab, HistoryView};
pub use landing::LandingView;
pub use summarize::{SummarizeMode, SummarizeView};

use crate::error;

/// Inline message for a failed operation
///
/// Returns `None` for a 401: the session-expired hook has already moved the
/// user to the login screen, and that outcome wins over any page-local error.
pub(crate) fn inline_error(err: &anyhow::Error, fallback: &str) -> Option<String> {
    if error::is_unauthorized(err) {
        return None;
    }
    Some(error::display_message(err, fallback))
}
