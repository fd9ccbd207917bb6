use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::entities::chat_exchange::ChatExchange,
    ports::session_repository::{SessionRepository, SessionRepositoryError},
};

/// Chat histories kept in the memory of the process, lost on restart.
///
/// Sessions never expire: the map only shrinks when a session is cleared.
#[derive(Default)]
pub struct SessionMemoryRepository {
    histories: RwLock<HashMap<String, Vec<ChatExchange>>>,
}

impl SessionMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for SessionMemoryRepository {
    #[tracing::instrument(name = "Creating session", skip(self))]
    async fn create(&self, session_id: &str) -> Result<(), SessionRepositoryError> {
        self.histories
            .write()
            .await
            .insert(session_id.to_string(), vec![]);
        Ok(())
    }

    #[tracing::instrument(name = "Getting session history", skip(self))]
    async fn get_history(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatExchange>, SessionRepositoryError> {
        Ok(self
            .histories
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    #[tracing::instrument(name = "Saving session history", skip(self, history), fields(exchanges = history.len()))]
    async fn save_history(
        &self,
        session_id: &str,
        history: &[ChatExchange],
    ) -> Result<(), SessionRepositoryError> {
        self.histories
            .write()
            .await
            .insert(session_id.to_string(), history.to_vec());
        Ok(())
    }

    #[tracing::instrument(name = "Deleting session", skip(self))]
    async fn delete(&self, session_id: &str) -> Result<(), SessionRepositoryError> {
        self.histories.write().await.remove(session_id);
        Ok(())
    }
}
