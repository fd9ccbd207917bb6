use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{
        self, value::Kind, vectors_config::Config, CreateCollection, Distance, ListValue,
        PointStruct, SearchPoints, Struct, VectorParams, VectorsConfig,
    },
};
use serde_json::{Map, Number, Value as JsonValue};
use tracing::info;

use crate::{
    domain::entities::{article_point::ArticlePoint, embedding::Embedding},
    ports::vector_index_port::{VectorIndexError, VectorIndexPort},
};

/// Vector index backed by Qdrant (gRPC API)
pub struct VectorIndexQdrantRepository {
    client: QdrantClient,
}

impl VectorIndexQdrantRepository {
    pub fn new(client: QdrantClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VectorIndexPort for VectorIndexQdrantRepository {
    #[tracing::instrument(name = "Listing Qdrant collections", skip(self))]
    async fn list_collections(&self) -> Result<Vec<String>, VectorIndexError> {
        let response = self.client.list_collections().await.map_err(to_index_error)?;

        Ok(response
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    #[tracing::instrument(name = "Creating Qdrant collection", skip(self))]
    async fn create_collection(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), VectorIndexError> {
        self.client
            .create_collection(&CreateCollection {
                collection_name: collection_name.to_string(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: vector_size,
                        distance: Distance::Cosine as i32,
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
            .map_err(to_index_error)?;

        Ok(())
    }

    #[tracing::instrument(name = "Deleting Qdrant collection", skip(self))]
    async fn delete_collection(&self, collection_name: &str) -> Result<(), VectorIndexError> {
        match self.client.delete_collection(collection_name).await {
            Ok(_) => Ok(()),
            Err(error) => {
                // Qdrant client only returns anyhow errors, the status has to be read from the message
                let message = error.to_string();
                if message.contains("not found") || message.contains("doesn't exist") {
                    Err(VectorIndexError::NotFound(collection_name.to_string()))
                } else {
                    Err(VectorIndexError::IndexError(message))
                }
            }
        }
    }

    #[tracing::instrument(name = "Saving article point to Qdrant", skip(self, point), fields(point_id = %point.id))]
    async fn upsert_point(
        &self,
        collection_name: &str,
        point: ArticlePoint,
    ) -> Result<(), VectorIndexError> {
        self.client
            .upsert_points(collection_name, vec![PointStruct::from(point)], None)
            .await
            .map_err(to_index_error)?;

        info!("Saved article point");
        Ok(())
    }

    #[tracing::instrument(name = "Searching Qdrant collection", skip(self, vector))]
    async fn search(
        &self,
        collection_name: &str,
        vector: &Embedding,
        limit: u64,
    ) -> Result<Vec<Map<String, JsonValue>>, VectorIndexError> {
        let response = self
            .client
            .search_points(&SearchPoints {
                collection_name: collection_name.to_string(),
                vector: vector.as_ref().to_vec(),
                limit,
                with_payload: Some(true.into()),
                ..Default::default()
            })
            .await
            .map_err(to_index_error)?;

        Ok(response
            .result
            .into_iter()
            .map(|scored_point| payload_to_json(scored_point.payload))
            .collect())
    }
}

fn to_index_error(error: impl ToString) -> VectorIndexError {
    VectorIndexError::IndexError(error.to_string())
}

impl From<ArticlePoint> for PointStruct {
    fn from(article_point: ArticlePoint) -> Self {
        Self {
            id: Some(article_point.id.to_string().into()),
            vectors: Some(article_point.vector.into_inner().into()),
            payload: article_point
                .payload
                .into_iter()
                .map(|(key, value)| (key, json_to_qdrant_value(value)))
                .collect(),
        }
    }
}

fn json_to_qdrant_value(value: JsonValue) -> qdrant::Value {
    let kind = match value {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Kind::StringValue(s),
        JsonValue::Array(values) => Kind::ListValue(ListValue {
            values: values.into_iter().map(json_to_qdrant_value).collect(),
        }),
        JsonValue::Object(map) => Kind::StructValue(Struct {
            fields: map
                .into_iter()
                .map(|(key, value)| (key, json_to_qdrant_value(value)))
                .collect(),
        }),
    };

    qdrant::Value { kind: Some(kind) }
}

fn qdrant_value_to_json(value: qdrant::Value) -> JsonValue {
    match value.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(b),
        Some(Kind::IntegerValue(i)) => JsonValue::from(i),
        Some(Kind::DoubleValue(d)) => Number::from_f64(d).map_or(JsonValue::Null, JsonValue::Number),
        Some(Kind::StringValue(s)) => JsonValue::String(s),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(object)) => JsonValue::Object(payload_to_json(object.fields)),
    }
}

fn payload_to_json(payload: HashMap<String, qdrant::Value>) -> Map<String, JsonValue> {
    payload
        .into_iter()
        .map(|(key, value)| (key, qdrant_value_to_json(value)))
        .collect()
}
