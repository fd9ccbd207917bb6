use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::embedding::{Embedding, EmbeddingSizeMismatch};

/// Turns a text into a fixed size vector through an external embeddings provider.
///
/// Implementations do not retry, callers decide what to do with a failure.
#[async_trait]
pub trait EmbeddingsPort: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingsError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingsError {
    #[error(transparent)]
    SizeMismatch(#[from] EmbeddingSizeMismatch),
    /// Network, authentication or malformed response
    #[error("Embeddings request failed: {0}")]
    RequestFailed(String),
}

impl std::fmt::Debug for EmbeddingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
