//! Synopsis - terminal client for the summarization and AI chat service
//!
//! This library holds the client side of the product: the REST client, the
//! authentication state, the route guard, and a view model for every page.
//! The `synopsis` binary drives them from the terminal.
//!
//! # Architecture
//!
//! - `api`: HTTP client for `/api/v1` with the global 401 interceptor
//! - `auth`: signed-in user state (login, register, logout, restore)
//! - `app`: routes, route guard, navigator and the application context
//! - `views`: Landing, Login/Register forms, Summarize, Chat, History
//! - `layout`: header, navigation and list rendering for the terminal
//! - `storage`: where the session token and cached user live
//! - `attachment` / `validation`: client-side checks run before requests
//! - `config`, `error`, `cli`, `commands`: the usual plumbing
//!
//! # Example
//!
//! ```no_run
//! use synopsis::app::{AppContext, Route};
//! use synopsis::views::SummarizeView;
//! use synopsis::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = AppContext::init(Config::default()).await?;
//!     if ctx.enter(Route::Summarize) == Route::Summarize {
//!         let mut view = SummarizeView::new(&ctx.config);
//!         view.text = "Rust is a systems programming language.".to_string();
//!         view.submit(&ctx.api).await?;
//!     }
//!     ctx.shutdown();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod attachment;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod layout;
pub mod storage;
pub mod validation;
pub mod views;

// Re-export commonly used types
pub use api::ApiClient;
pub use app::{AppContext, Route};
pub use auth::{AuthProvider, AuthState};
pub use config::Config;
pub use error::{Result, SynopsisError};

#[cfg(test)]
pub mod test_utils;
