use async_trait::async_trait;
use common::helper::error_chain_fmt;
use serde_json::{Map, Value as JsonValue};

use crate::domain::entities::{article_point::ArticlePoint, embedding::Embedding};

/// Raw operations of the vector index provider.
///
/// Collections are always created with a cosine distance.
#[async_trait]
pub trait VectorIndexPort: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<String>, VectorIndexError>;

    async fn create_collection(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), VectorIndexError>;

    /// Fails with `VectorIndexError::NotFound` if the collection does not exist
    async fn delete_collection(&self, collection_name: &str) -> Result<(), VectorIndexError>;

    /// Inserts the point, or replaces the point with the same id
    async fn upsert_point(
        &self,
        collection_name: &str,
        point: ArticlePoint,
    ) -> Result<(), VectorIndexError>;

    /// Returns the payloads of the `limit` nearest points, most similar first
    async fn search(
        &self,
        collection_name: &str,
        vector: &Embedding,
        limit: u64,
    ) -> Result<Vec<Map<String, JsonValue>>, VectorIndexError>;
}

#[derive(thiserror::Error)]
pub enum VectorIndexError {
    #[error("Collection not found: {0}")]
    NotFound(String),
    #[error("Error from the vector index: {0}")]
    IndexError(String),
}

impl std::fmt::Debug for VectorIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
