use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    configuration::EmbeddingsSettings,
    domain::entities::embedding::Embedding,
    ports::embeddings_port::{EmbeddingsError, EmbeddingsPort},
};

/// Embeddings request, one text at a time
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    task: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingsData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsData {
    embedding: Option<Vec<f32>>,
}

impl EmbeddingsResponse {
    /// Extracts and validates the first embedding of the response
    pub fn try_into_embedding(self) -> Result<Embedding, EmbeddingsError> {
        let values = self
            .data
            .into_iter()
            .next()
            .and_then(|data| data.embedding)
            .ok_or_else(|| {
                EmbeddingsError::RequestFailed("No embedding in the response".to_string())
            })?;

        Ok(Embedding::parse(values)?)
    }
}

/// Embeddings provider reached over HTTP (Jina AI embeddings API)
pub struct EmbeddingsJinaRepository {
    client: Client,
    api_base: String,
    api_key: Secret<String>,
    model: String,
    task: String,
}

impl EmbeddingsJinaRepository {
    pub fn try_new(settings: &EmbeddingsSettings) -> Result<Self, EmbeddingsError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| EmbeddingsError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            task: settings.task.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingsPort for EmbeddingsJinaRepository {
    #[tracing::instrument(name = "Embedding a text", skip(self, text), fields(text_length = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingsError> {
        let request = EmbeddingsRequest {
            model: &self.model,
            task: &self.task,
            input: [text],
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingsError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "Embeddings provider returned an error");
            return Err(EmbeddingsError::RequestFailed(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let embedding = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::RequestFailed(format!("Invalid response: {}", e)))?
            .try_into_embedding()?;

        debug!("Embedding of size {} generated", embedding.len());
        Ok(embedding)
    }
}
