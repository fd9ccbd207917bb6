use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::chat_exchange::ChatExchange;

/// Key-value persistence of chat histories, one history per session id.
///
/// Reading then saving a history is not atomic: concurrent chats on the same session
/// can overwrite each other, the last write wins.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores an empty history for a new session
    async fn create(&self, session_id: &str) -> Result<(), SessionRepositoryError>;

    /// Returns the history of a session, empty if the session is unknown
    async fn get_history(&self, session_id: &str)
        -> Result<Vec<ChatExchange>, SessionRepositoryError>;

    async fn save_history(
        &self,
        session_id: &str,
        history: &[ChatExchange],
    ) -> Result<(), SessionRepositoryError>;

    async fn delete(&self, session_id: &str) -> Result<(), SessionRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum SessionRepositoryError {
    #[error("Error from the session store: {0}")]
    StoreError(String),
}

impl std::fmt::Debug for SessionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
