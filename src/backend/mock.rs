//! Scripted backend for tests and demos.
//!
//! Answers are keyed by the exact query text. Unscripted queries get
//! `"answer: <query>"`, unscripted translations get `"[<to>] <text>"`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::Backend;
use super::wire::{ChatReply, ChatRequest, TranslateRequest};
use crate::error::BackendError;
use crate::session::Source;

/// A failure the mock reports instead of answering.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// `success: false` with this message.
    Rejected(String),
    /// Non-2xx response with this status.
    Status(u16),
}

impl MockFailure {
    fn into_error(self, path: &str) -> BackendError {
        match self {
            Self::Rejected(message) => BackendError::Rejected(message),
            Self::Status(status) => BackendError::Status {
                url: format!("mock://{path}"),
                status,
                body: String::new(),
            },
        }
    }
}

/// Scripted response for one chat query.
#[derive(Debug, Clone)]
pub struct MockChat {
    pub result: Result<ChatReply, MockFailure>,
    pub delay: Duration,
}

impl MockChat {
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            result: Ok(ChatReply {
                answer: answer.into(),
                sources: Vec::new(),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn failure(failure: MockFailure) -> Self {
        Self {
            result: Err(failure),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_source(mut self, label: &str, score: f64, page_count: Option<u32>) -> Self {
        if let Ok(reply) = &mut self.result {
            reply.sources.push(Source {
                label: label.to_string(),
                score,
                page_count,
            });
        }
        self
    }

    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A call the mock received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedCall {
    Chat(ChatRequest),
    Translate(TranslateRequest),
}

#[derive(Default)]
pub struct MockBackend {
    chats: HashMap<String, MockChat>,
    translations: HashMap<(String, String), String>,
    translation_failure: Option<MockFailure>,
    translation_delay: Duration,
    calls: Mutex<Vec<CapturedCall>>,
    active_chats: AtomicUsize,
    max_active_chats: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_chat(mut self, query: &str, chat: MockChat) -> Self {
        self.chats.insert(query.to_string(), chat);
        self
    }

    #[must_use]
    pub fn with_translation(mut self, text: &str, to: &str, translated: &str) -> Self {
        self.translations
            .insert((text.to_string(), to.to_string()), translated.to_string());
        self
    }

    /// Makes every unscripted translation fail.
    #[must_use]
    pub fn failing_translations(mut self, failure: MockFailure) -> Self {
        self.translation_failure = Some(failure);
        self
    }

    #[must_use]
    pub const fn with_translation_delay(mut self, delay: Duration) -> Self {
        self.translation_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CapturedCall::Chat(request) => Some(request),
                CapturedCall::Translate(_) => None,
            })
            .collect()
    }

    pub fn translate_requests(&self) -> Vec<TranslateRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CapturedCall::Translate(request) => Some(request),
                CapturedCall::Chat(_) => None,
            })
            .collect()
    }

    /// Highest number of chat calls that were in progress at the same time.
    pub fn max_concurrent_chats(&self) -> usize {
        self.max_active_chats.load(Ordering::SeqCst)
    }

    fn record(&self, call: CapturedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.record(CapturedCall::Chat(request.clone()));

        let active = self.active_chats.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_chats.fetch_max(active, Ordering::SeqCst);

        let scripted = self
            .chats
            .get(&request.query)
            .cloned()
            .unwrap_or_else(|| MockChat::answer(format!("answer: {}", request.query)));

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        self.active_chats.fetch_sub(1, Ordering::SeqCst);

        scripted.result.map_err(|failure| failure.into_error("chat"))
    }

    async fn translate(&self, request: &TranslateRequest) -> Result<String, BackendError> {
        self.record(CapturedCall::Translate(request.clone()));

        if !self.translation_delay.is_zero() {
            tokio::time::sleep(self.translation_delay).await;
        }

        let key = (request.text.clone(), request.to_language.clone());
        if let Some(translated) = self.translations.get(&key) {
            return Ok(translated.clone());
        }
        if let Some(failure) = &self.translation_failure {
            return Err(failure.clone().into_error("translate"));
        }
        Ok(format!("[{}] {}", request.to_language, request.text))
    }
}
