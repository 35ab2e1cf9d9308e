//! Client-side chat sessions.
//!
//! A [`ChatSession`] keeps the transcript of one conversation and drives each
//! message through the send pipeline:
//!
//! 1. translate the question to English (unless the backend translates itself),
//! 2. ask the chat backend within the configured bound,
//! 3. translate the answer back to the display language.
//!
//! Translation failures fall back to the untranslated text. Backend failures
//! and timeouts become an error reply in the transcript; they never surface as
//! `Err` to the caller.

mod chat;
mod pipeline;
mod turn;

pub use chat::{ChatSession, DEFAULT_TIMEOUT, SessionConfig};
pub use turn::{AttachmentRef, Role, Source, Turn, TurnId, TurnStatus};
