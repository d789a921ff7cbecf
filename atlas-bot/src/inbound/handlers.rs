use super::api::{ApiError, ApiSuccess};
use crate::domain::models::{Command, CommandRequest, ParseCommandError, UserId};
use crate::domain::ports::AtlasService;
use crate::inbound::AppState;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

/// The body of a command request: one chat message and who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandHttpRequestBody {
    user_id: i64,
    text: String,
}

impl CommandHttpRequestBody {
    /// Converts the HTTP request body into a domain request.
    fn try_into_domain(self) -> Result<CommandRequest, ParseCommandError> {
        let command = Command::parse(&self.text)?;
        Ok(CommandRequest::new(UserId::from(self.user_id), command))
    }
}

/// Run a chat command.
///
/// # Responses
///
/// - 200 OK: the command ran, the body holds the reply (text or photo).
/// - 422 Unprocessable entity: the message was not a valid command, the body holds a usage hint.
/// - 500 Internal server error: storage or rendering failed, the body holds a retry hint.
pub(super) async fn command_handler<AS: AtlasService>(
    State(state): State<AppState<AS>>,
    Json(body): Json<CommandHttpRequestBody>,
) -> Result<ApiSuccess, ApiError> {
    let domain_req = body.try_into_domain()?;
    state
        .atlas_service
        .handle_command(&domain_req)
        .await
        .map_err(ApiError::from)
        .map(|reply| ApiSuccess::new(StatusCode::OK, reply.into()))
}

pub(super) async fn health_handler() -> &'static str {
    "OK"
}
