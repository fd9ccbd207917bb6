use common::helper::error_chain_fmt;
use serde::Serialize;

/// Dimension of every vector stored in or queried against the articles collection
pub const EMBEDDING_SIZE: usize = 1024;

/// A dense vector produced by the embeddings provider.
///
/// Only built through `Embedding::parse`, so holding one means its length is `EMBEDDING_SIZE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn parse(values: Vec<f32>) -> Result<Self, EmbeddingSizeMismatch> {
        if values.len() != EMBEDDING_SIZE {
            return Err(EmbeddingSizeMismatch {
                observed: values.len(),
            });
        }

        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[derive(thiserror::Error, PartialEq, Eq)]
#[error("Invalid embedding size: {observed}, expected {}", EMBEDDING_SIZE)]
pub struct EmbeddingSizeMismatch {
    pub observed: usize,
}

impl std::fmt::Debug for EmbeddingSizeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
