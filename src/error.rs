//! Error types for Synopsis
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.
//!
//! Errors fall into three tiers that views treat differently:
//!
//! - [`SynopsisError::Validation`] / [`SynopsisError::Attachment`] are raised
//!   before any request is sent.
//! - [`SynopsisError::Api`] carries the message reported by the server and is
//!   shown verbatim in the active view.
//! - [`SynopsisError::Unauthorized`] is handled globally by the API client,
//!   which clears credentials and fires the session-expired hook.

use thiserror::Error;

/// Main error type for Synopsis operations
#[derive(Error, Debug)]
pub enum SynopsisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side form validation failed; no request was issued
    #[error("{0}")]
    Validation(String),

    /// An attachment was rejected before upload (type or size)
    #[error("{0}")]
    Attachment(String),

    /// The server answered 401; credentials have been cleared
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A protected page was requested without a signed-in user
    #[error("Not signed in. Run 'synopsis login' first.")]
    NotSignedIn,

    /// Non-2xx response carrying a server-provided message
    #[error("{message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The request never produced a response (connect, timeout, decode)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credential storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Synopsis operations
///
/// Uses `anyhow::Error` so context can be attached while propagating;
/// callers classify failures with [`classify`].
pub type Result<T> = anyhow::Result<T>;

/// Returns the [`SynopsisError`] inside an `anyhow::Error`, if any.
pub fn classify(err: &anyhow::Error) -> Option<&SynopsisError> {
    err.downcast_ref::<SynopsisError>()
}

/// True when the error is the global 401 outcome.
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    matches!(classify(err), Some(SynopsisError::Unauthorized(_)))
}

/// Message suitable for inline display in a view.
///
/// Server and validation messages are shown verbatim; anything else falls
/// back to `fallback` so transport noise does not leak into the UI.
pub fn display_message(err: &anyhow::Error, fallback: &str) -> String {
    match classify(err) {
        Some(SynopsisError::Api { message, .. })
        | Some(SynopsisError::Validation(message))
        | Some(SynopsisError::Attachment(message))
        | Some(SynopsisError::Unauthorized(message)) => message.clone(),
        _ => fallback.to_string(),
    }
}
