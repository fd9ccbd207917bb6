use actix_web::{
    http::{header::ContentType, StatusCode},
    web, HttpResponse, ResponseError,
};
use common::helper::error_chain_fmt;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::ports::session_repository::{SessionRepository, SessionRepositoryError};

#[tracing::instrument(name = "Create session handler", skip(session_repository))]
pub async fn create_session(
    session_repository: web::Data<dyn SessionRepository>,
) -> Result<HttpResponse, SessionError> {
    let session_id = Uuid::new_v4().to_string();
    session_repository.create(&session_id).await?;

    info!(%session_id, "Session created");
    Ok(HttpResponse::Ok().json(json!({ "sessionId": session_id })))
}

#[tracing::instrument(name = "Clear session handler", skip(session_repository))]
pub async fn clear_session(
    session_repository: web::Data<dyn SessionRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, SessionError> {
    let session_id = path.into_inner();
    session_repository.delete(&session_id).await?;

    info!(%session_id, "Session cleared");
    Ok(HttpResponse::Ok().json(json!({ "status": "cleared" })))
}

#[derive(thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    RepositoryError(#[from] SessionRepositoryError),
}

impl std::fmt::Debug for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": "Session store unavailable" }))
    }
}
