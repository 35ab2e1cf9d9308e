//! JSON bodies exchanged with the `/chat` and `/translate` endpoints.

use serde::{Deserialize, Serialize};

use crate::session::Source;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<WireSource>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSource {
    pub file_name: String,
    #[serde(default)]
    pub page_count: Option<u32>,
    pub score: f64,
}

impl From<WireSource> for Source {
    fn from(source: WireSource) -> Self {
        Self {
            label: source.file_name,
            score: source.score,
            page_count: source.page_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_language: Option<String>,
    pub to_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateResponse {
    pub success: bool,
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successful chat answer with its citations in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub answer: String,
    pub sources: Vec<Source>,
}
