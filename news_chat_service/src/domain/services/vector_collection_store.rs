use std::sync::Arc;

use common::helper::error_chain_fmt;
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::{
    domain::entities::{
        article_point::ArticlePoint,
        embedding::{Embedding, EMBEDDING_SIZE},
    },
    ports::vector_index_port::{VectorIndexError, VectorIndexPort},
};

/// Payload field returned by `search`
const PAYLOAD_TEXT_KEY: &str = "text";

/// Lifecycle and queries of the one collection holding the article points.
///
/// The collection is never assumed to exist: readers call `ensure` before searching,
/// the ingestion calls `reset` to start from an empty collection.
pub struct VectorCollectionStore {
    index: Arc<dyn VectorIndexPort>,
    collection_name: String,
}

impl VectorCollectionStore {
    pub fn new(index: Arc<dyn VectorIndexPort>, collection_name: &str) -> Self {
        Self {
            index,
            collection_name: collection_name.to_string(),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Creates the collection if it does not exist yet.
    ///
    /// Failures are logged and swallowed: a reader can still try its query.
    #[tracing::instrument(name = "Ensuring the articles collection exists", skip(self), fields(collection = %self.collection_name))]
    pub async fn ensure(&self) {
        if let Err(error) = self.try_ensure().await {
            error!(?error, "Failed to check/create the collection");
        }
    }

    async fn try_ensure(&self) -> Result<(), VectorIndexError> {
        let collections = self.index.list_collections().await?;

        if collections.iter().any(|name| name == &self.collection_name) {
            return Ok(());
        }

        warn!("Collection {} not found, creating it", self.collection_name);
        self.create().await?;
        info!("Collection {} created", self.collection_name);
        Ok(())
    }

    /// Deletes the collection, if any, and creates it again.
    ///
    /// A missing collection is not an error. Only a failure of the creation is returned.
    /// When the deletion failed for another reason, the old collection is most likely still
    /// there and the creation fails with it: both errors are then returned together.
    #[tracing::instrument(name = "Resetting the articles collection", skip(self), fields(collection = %self.collection_name))]
    pub async fn reset(&self) -> Result<(), VectorCollectionStoreError> {
        let delete_error = match self.index.delete_collection(&self.collection_name).await {
            Ok(()) => {
                info!("Deleted old collection {}", self.collection_name);
                None
            }
            Err(VectorIndexError::NotFound(_)) => {
                info!("No collection {} to delete", self.collection_name);
                None
            }
            Err(error) => {
                error!(
                    ?error,
                    "Failed to delete the collection, it was probably left in place"
                );
                Some(error)
            }
        };

        if let Err(create_error) = self.create().await {
            return Err(match delete_error {
                Some(delete) => VectorCollectionStoreError::RecreateCollectionError {
                    delete,
                    create: create_error,
                },
                None => VectorCollectionStoreError::CreateCollectionError(create_error),
            });
        }

        info!("Collection {} created", self.collection_name);
        Ok(())
    }

    #[tracing::instrument(name = "Upserting an article point", skip(self, point), fields(point_id = %point.id))]
    pub async fn upsert(&self, point: ArticlePoint) -> Result<(), VectorCollectionStoreError> {
        self.index
            .upsert_point(&self.collection_name, point)
            .await
            .map_err(VectorCollectionStoreError::UpsertError)
    }

    /// Returns the `text` field of the `top_k` most similar points, most similar first.
    ///
    /// A point without a text field gives an empty string.
    #[tracing::instrument(name = "Searching similar articles", skip(self, vector))]
    pub async fn search(
        &self,
        vector: &Embedding,
        top_k: u64,
    ) -> Result<Vec<String>, VectorCollectionStoreError> {
        let payloads = self
            .index
            .search(&self.collection_name, vector, top_k)
            .await
            .map_err(VectorCollectionStoreError::SearchError)?;

        Ok(payloads
            .iter()
            .take(top_k as usize)
            .map(|payload| match payload.get(PAYLOAD_TEXT_KEY) {
                Some(JsonValue::String(text)) => text.clone(),
                _ => String::new(),
            })
            .collect())
    }

    async fn create(&self) -> Result<(), VectorIndexError> {
        self.index
            .create_collection(&self.collection_name, EMBEDDING_SIZE as u64)
            .await
    }
}

#[derive(thiserror::Error)]
pub enum VectorCollectionStoreError {
    #[error("Failed to create the collection")]
    CreateCollectionError(#[source] VectorIndexError),
    #[error("Failed to recreate the collection after its deletion failed: {delete}")]
    RecreateCollectionError {
        delete: VectorIndexError,
        #[source]
        create: VectorIndexError,
    },
    #[error("Failed to upsert the point")]
    UpsertError(#[source] VectorIndexError),
    #[error("Failed to search the collection")]
    SearchError(#[source] VectorIndexError),
}

impl std::fmt::Debug for VectorCollectionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
