use actix_web::{web, HttpResponse};

use crate::ports::session_repository::SessionRepository;

use super::SessionError;

/// Exchanges of a session, oldest first. Unknown sessions have an empty history.
#[tracing::instrument(name = "Session history handler", skip(session_repository))]
pub async fn session_history(
    session_repository: web::Data<dyn SessionRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, SessionError> {
    let history = session_repository.get_history(&path).await?;

    Ok(HttpResponse::Ok().json(history))
}
