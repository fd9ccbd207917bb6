use async_trait::async_trait;
use common::helper::error_chain_fmt;
use serde::{Deserialize, Serialize};

use crate::domain::entities::conversation_turn::{ConversationTurn, Role};

/// Sends one request to the generative text provider, without any retry
#[async_trait]
pub trait GenerateContentPort: Send + Sync {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerateContentError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_turns(turns: &[ConversationTurn]) -> Self {
        Self {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role,
                    parts: vec![Part {
                        text: Some(turn.text.clone()),
                    }],
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate joined with a space.
    ///
    /// `None` if there is no candidate or if it holds no text part.
    pub fn answer_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts.iter().filter_map(|part| part.text.as_deref()).collect();

        if texts.is_empty() {
            return None;
        }

        Some(texts.join(" "))
    }
}

#[derive(thiserror::Error)]
pub enum GenerateContentError {
    /// HTTP 503, the only failure worth retrying
    #[error("The generative provider is overloaded")]
    Overloaded,
    #[error("The generative provider answered with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Generative request failed: {0}")]
    RequestFailed(String),
}

impl std::fmt::Debug for GenerateContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
