//! Public welcome page

use crate::app::{Navigator, Route};
use crate::auth::AuthProvider;

pub const FEATURES: [(&str, &str); 3] = [
    (
        "Summarize",
        "Condense long text, web pages or documents into the key points",
    ),
    (
        "Chat",
        "Ask questions and discuss your documents with the AI assistant",
    ),
    (
        "History",
        "Revisit past summaries and conversations at any time",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LandingView;

impl LandingView {
    pub fn features(&self) -> &'static [(&'static str, &'static str)] {
        &FEATURES
    }

    /// Signed-in users go straight to work; everyone else signs up
    pub fn get_started_target(&self, auth: &AuthProvider) -> Route {
        if auth.is_authenticated() {
            Route::Summarize
        } else {
            Route::Register
        }
    }

    pub fn get_started(&self, auth: &AuthProvider, navigator: &Navigator) -> Route {
        let target = self.get_started_target(auth);
        navigator.navigate(target);
        target
    }
}
