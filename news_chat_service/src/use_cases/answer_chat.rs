use std::sync::Arc;

use common::helper::error_chain_fmt;
use tracing::info;

use crate::{
    configuration::HistoryMode,
    domain::{
        entities::chat_exchange::ChatExchange,
        services::{
            conversation_assembler::{assemble, assemble_with_history},
            generative_client::{GenerativeClient, GenerativeError},
            vector_collection_store::{VectorCollectionStore, VectorCollectionStoreError},
        },
    },
    ports::embeddings_port::{EmbeddingsError, EmbeddingsPort},
};

pub const DEFAULT_TOP_K: u64 = 3;

/// Answers a user message from the most similar ingested articles
pub struct AnswerChatUseCase {
    embeddings: Arc<dyn EmbeddingsPort>,
    store: Arc<VectorCollectionStore>,
    generative_client: Arc<GenerativeClient>,
    top_k: u64,
    history_mode: HistoryMode,
}

impl AnswerChatUseCase {
    pub fn new(
        embeddings: Arc<dyn EmbeddingsPort>,
        store: Arc<VectorCollectionStore>,
        generative_client: Arc<GenerativeClient>,
    ) -> Self {
        Self {
            embeddings,
            store,
            generative_client,
            top_k: DEFAULT_TOP_K,
            history_mode: HistoryMode::default(),
        }
    }

    pub fn with_top_k(mut self, top_k: u64) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_history_mode(mut self, history_mode: HistoryMode) -> Self {
        self.history_mode = history_mode;
        self
    }

    /// Embeds the message, retrieves `top_k` article texts and asks the generative model.
    pub async fn answer(&self, user_message: &str) -> Result<String, AnswerChatError> {
        self.answer_with_history(user_message, &[]).await
    }

    /// Like `answer`. The history is only sent to the model in `HistoryMode::HistoryAware`.
    #[tracing::instrument(
        name = "Answering chat message",
        skip(self, user_message, history),
        fields(history_mode = ?self.history_mode, history = history.len())
    )]
    pub async fn answer_with_history(
        &self,
        user_message: &str,
        history: &[ChatExchange],
    ) -> Result<String, AnswerChatError> {
        let vector = self.embeddings.embed(user_message).await?;

        self.store.ensure().await;
        let context_texts = self.store.search(&vector, self.top_k).await?;
        info!("Retrieved {} context texts", context_texts.len());

        let conversation = match self.history_mode {
            HistoryMode::Stateless => assemble(&context_texts, user_message),
            HistoryMode::HistoryAware => assemble_with_history(
                history,
                &context_texts,
                user_message,
                self.generative_client.max_history(),
            ),
        };

        Ok(self.generative_client.generate(&conversation).await?)
    }
}

#[derive(thiserror::Error)]
pub enum AnswerChatError {
    #[error("Failed to embed the message")]
    Embeddings(#[from] EmbeddingsError),
    #[error("Failed to retrieve articles")]
    VectorStore(#[from] VectorCollectionStoreError),
    #[error("Failed to generate the answer")]
    Generative(#[from] GenerativeError),
}

impl std::fmt::Debug for AnswerChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
