use serde::{Deserialize, Serialize};

/// One question/answer pair of a chat session history
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatExchange {
    pub user: String,
    pub bot: String,
}
