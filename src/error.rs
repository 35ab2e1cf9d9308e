//! Error types for chat sessions and the backend collaborator.

use std::time::Duration;
use thiserror::Error;

use crate::session::TurnId;

/// Errors reported synchronously to callers of [`ChatSession`](crate::session::ChatSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The submission had neither text nor attachments.
    #[error("Nothing to send: the message is blank and has no attachments")]
    Validation,

    /// The bot scope cannot change while a request is outstanding.
    #[error("Cannot change the bot while request {pending} is still in flight")]
    InvalidState { pending: TurnId },

    /// The session was disposed and no longer accepts work.
    #[error("Chat session has been closed")]
    Disposed,
}

/// A failed call to the chat or translation backend.
///
/// Transport failures, non-2xx responses and `success: false` replies all land
/// here; the session treats every variant the same way.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

impl BackendError {
    /// Short label for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Rejected(_) => "rejected",
            Self::Malformed(_) => "malformed",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// A translation round trip that failed and was replaced by the original text.
#[derive(Debug, Error)]
#[error("Translation {from} -> {to} failed: {source}")]
pub struct TranslationError {
    pub from: String,
    pub to: String,
    #[source]
    pub source: BackendError,
}
