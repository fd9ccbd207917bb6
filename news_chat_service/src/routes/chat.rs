use actix_web::{
    http::{header::ContentType, StatusCode},
    web, HttpResponse, ResponseError,
};
use common::helper::error_chain_fmt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    domain::entities::chat_exchange::ChatExchange,
    ports::session_repository::{SessionRepository, SessionRepositoryError},
    use_cases::answer_chat::{AnswerChatError, AnswerChatUseCase},
};

const CHAT_FAILURE_MESSAGE: &str = "Failed to get response";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBodyData {
    pub session_id: String,
    pub message: String,
}

/// Answers a message and appends the exchange to the session history.
///
/// The history is read then written back: two concurrent messages on one session
/// can lose an exchange.
#[tracing::instrument(
    name = "Chat handler",
    skip(answer_chat, session_repository, body),
    fields(session_id = %body.session_id)
)]
pub async fn chat(
    answer_chat: web::Data<AnswerChatUseCase>,
    session_repository: web::Data<dyn SessionRepository>,
    body: web::Json<ChatBodyData>,
) -> Result<HttpResponse, ChatError> {
    let ChatBodyData {
        session_id,
        message,
    } = body.into_inner();

    let mut history = session_repository.get_history(&session_id).await?;

    let reply = answer_chat.answer_with_history(&message, &history).await?;

    history.push(ChatExchange {
        user: message,
        bot: reply.clone(),
    });
    session_repository.save_history(&session_id, &history).await?;

    info!(exchanges = history.len(), "Replied to chat message");
    Ok(HttpResponse::Ok().json(json!({ "reply": reply })))
}

#[derive(thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    AnswerChatError(#[from] AnswerChatError),
    #[error(transparent)]
    SessionRepositoryError(#[from] SessionRepositoryError),
}

impl std::fmt::Debug for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Details stay in the logs, clients only get a generic message
    #[tracing::instrument(name = "Response error from chat handler", skip(self), fields(error = ?self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": CHAT_FAILURE_MESSAGE }))
    }
}
