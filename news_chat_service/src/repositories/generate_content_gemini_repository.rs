use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use tracing::debug;

use crate::{
    configuration::GenerativeSettings,
    ports::generate_content_port::{
        GenerateContentError, GenerateContentPort, GenerateContentRequest, GenerateContentResponse,
    },
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` endpoint
pub struct GenerateContentGeminiRepository {
    client: Client,
    endpoint: String,
    api_key: Secret<String>,
}

impl GenerateContentGeminiRepository {
    pub fn new(settings: &GenerativeSettings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.generate_content_url(),
            api_key: settings.api_key.clone(),
        }
    }
}

#[async_trait]
impl GenerateContentPort for GenerateContentGeminiRepository {
    #[tracing::instrument(name = "Calling Gemini generateContent", skip(self, request), fields(contents = request.contents.len()))]
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerateContentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| GenerateContentError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::SERVICE_UNAVAILABLE => Err(GenerateContentError::Overloaded),
            status if status.is_success() => {
                let response = response
                    .json::<GenerateContentResponse>()
                    .await
                    .map_err(|e| {
                        GenerateContentError::RequestFailed(format!("Invalid response: {}", e))
                    })?;

                debug!(candidates = response.candidates.len(), "Gemini answered");
                Ok(response)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GenerateContentError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: body.chars().take(500).collect(),
                })
            }
        }
    }
}
