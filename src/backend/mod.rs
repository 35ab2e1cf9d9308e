//! The chat and translation backend, consumed over HTTP.

mod client;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod wire;

use async_trait::async_trait;

use crate::error::BackendError;

pub use client::HttpBackend;
pub use wire::{
    ChatReply, ChatRequest, ChatResponse, TranslateRequest, TranslateResponse, WireSource,
};

/// Operations a chat session needs from the backend.
///
/// Implementations normalize every kind of failure (transport, HTTP status,
/// `success: false`) into [`BackendError`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    /// Returns the translated text.
    async fn translate(&self, request: &TranslateRequest) -> Result<String, BackendError>;
}
