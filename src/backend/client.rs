use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Backend;
use super::wire::{ChatReply, ChatRequest, ChatResponse, TranslateRequest, TranslateResponse};
use crate::error::BackendError;

/// [`Backend`] over HTTP.
///
/// Timeouts are applied by the caller so that every backend implementation
/// gets the same bound.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint.trim_end_matches('/'))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(BackendError::Status {
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let response: ChatResponse = self.post("chat", request).await?;

        if !response.success {
            return Err(BackendError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }

        let answer = response
            .answer
            .ok_or_else(|| BackendError::Malformed("missing 'answer'".to_string()))?;

        Ok(ChatReply {
            answer,
            sources: response
                .sources
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    }

    async fn translate(&self, request: &TranslateRequest) -> Result<String, BackendError> {
        let response: TranslateResponse = self.post("translate", request).await?;

        if !response.success {
            return Err(BackendError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }

        response
            .translated_text
            .ok_or_else(|| BackendError::Malformed("missing 'translated_text'".to_string()))
    }
}
