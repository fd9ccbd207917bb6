use std::sync::Arc;

use common::helper::error_chain_fmt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    domain::{
        entities::conversation_turn::ConversationTurn,
        services::backoff::{BackoffPolicy, BackoffStep},
    },
    ports::generate_content_port::{
        GenerateContentError, GenerateContentPort, GenerateContentRequest,
    },
};

/// Returned when the provider answered without any usable text
pub const NO_ANSWER_MESSAGE: &str = "No answer from Gemini.";
/// Returned when the provider stayed overloaded for every attempt
pub const UNAVAILABLE_MESSAGE: &str =
    "Sorry, the assistant is temporarily unavailable. Please try again later.";

/// Maximum number of turns sent to the provider
pub const DEFAULT_MAX_HISTORY: usize = 5;

/// Sends conversations to the generative provider.
///
/// Overloaded responses (HTTP 503) are retried following the backoff policy and end up
/// in `UNAVAILABLE_MESSAGE` once attempts are exhausted. Any other failure is returned at once.
pub struct GenerativeClient {
    api: Arc<dyn GenerateContentPort>,
    backoff_policy: BackoffPolicy,
    max_history: usize,
}

impl GenerativeClient {
    pub fn new(
        api: Arc<dyn GenerateContentPort>,
        backoff_policy: BackoffPolicy,
        max_history: usize,
    ) -> Self {
        Self {
            api,
            backoff_policy,
            max_history,
        }
    }

    /// Maximum number of turns sent per request
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub async fn generate(
        &self,
        conversation: &[ConversationTurn],
    ) -> Result<String, GenerativeError> {
        // Never cancelled
        self.generate_with_cancellation(conversation, &CancellationToken::new())
            .await
    }

    /// Same as `generate`, but gives up waiting between two attempts once `cancellation` is cancelled.
    ///
    /// An in-flight request is not interrupted, only the backoff waits are.
    #[tracing::instrument(
        name = "Generating an answer",
        skip(self, conversation, cancellation),
        fields(turns = conversation.len())
    )]
    pub async fn generate_with_cancellation(
        &self,
        conversation: &[ConversationTurn],
        cancellation: &CancellationToken,
    ) -> Result<String, GenerativeError> {
        let window_start = conversation.len().saturating_sub(self.max_history);
        let request = GenerateContentRequest::from_turns(&conversation[window_start..]);

        let mut backoff = self.backoff_policy.start();

        loop {
            match self.api.generate_content(&request).await {
                Ok(response) => {
                    info!(attempts = backoff.attempts() + 1, "Received an answer");
                    return Ok(response
                        .answer_text()
                        .unwrap_or_else(|| NO_ANSWER_MESSAGE.to_string()));
                }
                Err(GenerateContentError::Overloaded) => match backoff.on_transient_failure() {
                    BackoffStep::Retry(delay) => {
                        warn!(
                            attempt = backoff.attempts(),
                            "Generative provider overloaded, retrying in {}ms",
                            delay.as_millis()
                        );

                        tokio::select! {
                            _ = cancellation.cancelled() => return Err(GenerativeError::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    BackoffStep::Exhausted => {
                        error!(
                            attempts = backoff.attempts(),
                            "Generative provider still overloaded, giving up"
                        );
                        return Ok(UNAVAILABLE_MESSAGE.to_string());
                    }
                },
                Err(error) => {
                    error!(?error, "Generative request failed");
                    return Err(GenerativeError::Fatal(error));
                }
            }
        }
    }
}

#[derive(thiserror::Error)]
pub enum GenerativeError {
    #[error("Failed to generate an answer")]
    Fatal(#[source] GenerateContentError),
    #[error("Answer generation was cancelled")]
    Cancelled,
}

impl std::fmt::Debug for GenerativeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
