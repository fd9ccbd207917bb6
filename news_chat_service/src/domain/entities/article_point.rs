use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use super::embedding::Embedding;

/// The unit stored in the articles collection: an id, its vector and the sanitized article fields
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePoint {
    pub id: Uuid,
    pub vector: Embedding,
    pub payload: Map<String, JsonValue>,
}
