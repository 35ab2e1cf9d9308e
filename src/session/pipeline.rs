//! The send pipeline: translate out, ask, translate back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::chat::Shared;
use super::turn::{Source, TurnId};
use crate::backend::{Backend, ChatRequest, TranslateRequest};
use crate::error::{BackendError, TranslationError};
use crate::i18n::{self, BACKEND_LANGUAGE, Phrase};

/// Everything a request needs, captured when the message was submitted.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub reply_id: TurnId,
    pub query: String,
    /// Skip translation for queries built from attachment names.
    pub translatable: bool,
    pub language: String,
    pub bot_scope: Option<String>,
}

/// How a pending reply turn resolves.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Delivered {
        text: String,
        raw_text: String,
        sources: Vec<Source>,
    },
    Failed {
        text: String,
    },
}

/// Runs queued jobs one at a time, so replies resolve in submission order.
pub(crate) struct Dispatcher {
    pub shared: Arc<Shared>,
    pub backend: Arc<dyn Backend>,
    pub timeout: Duration,
    pub server_translates: bool,
}

impl Dispatcher {
    pub async fn run(self, mut queue: mpsc::UnboundedReceiver<Job>) {
        while let Some(job) = queue.recv().await {
            if !self.shared.is_alive() {
                debug!("session closed, dropping queued requests");
                break;
            }
            let outcome = self.process(&job).await;
            self.shared.resolve(job.reply_id, outcome);
        }
    }

    pub async fn process(&self, job: &Job) -> Outcome {
        let client_translates = !self.server_translates && !i18n::is_backend_language(&job.language);

        let query = if client_translates && job.translatable {
            self.translate_or_keep(&job.query, &job.language, BACKEND_LANGUAGE)
                .await
        } else {
            job.query.clone()
        };

        let request = ChatRequest {
            query,
            bot_id: job.bot_scope.clone(),
            language: Some(job.language.clone()),
        };
        debug!(reply = %job.reply_id, bot = ?request.bot_id, "dispatching chat request");

        match self.bounded(self.backend.chat(&request)).await {
            Ok(reply) => {
                let text = if client_translates {
                    self.translate_or_keep(&reply.answer, BACKEND_LANGUAGE, &job.language)
                        .await
                } else {
                    reply.answer.clone()
                };
                Outcome::Delivered {
                    text,
                    raw_text: reply.answer,
                    sources: reply.sources,
                }
            }
            Err(err) => {
                warn!(reply = %job.reply_id, kind = err.kind(), error = %err, "chat request failed");
                Outcome::Failed {
                    text: self.error_text(&job.language, client_translates).await,
                }
            }
        }
    }

    async fn error_text(&self, language: &str, client_translates: bool) -> String {
        let text = i18n::phrase(language, Phrase::GenericError);
        if client_translates && !i18n::has_phrases(language) {
            return self
                .translate_or_keep(text, BACKEND_LANGUAGE, language)
                .await;
        }
        text.to_string()
    }

    /// Translates `text`, returning it unchanged if translation fails.
    async fn translate_or_keep(&self, text: &str, from: &str, to: &str) -> String {
        match self.translate(text, from, to).await {
            Ok(translated) => translated,
            Err(err) => {
                warn!(error = %err, kind = err.source.kind(), "using untranslated text");
                text.to_string()
            }
        }
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, TranslationError> {
        let request = TranslateRequest {
            text: text.to_string(),
            from_language: Some(from.to_string()),
            to_language: to.to_string(),
        };
        self.bounded(self.backend.translate(&request))
            .await
            .map_err(|source| TranslationError {
                from: from.to_string(),
                to: to.to_string(),
                source,
            })
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(BackendError::Timeout(self.timeout)))
    }
}
