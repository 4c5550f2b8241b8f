use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::message::Message;
use crate::models::user::User;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    pub body: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Response> {
    if req.body.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Message body is required.".to_string(),
        ));
    }
    if req.recipient_id == user.user_id {
        return Err(AppError::ValidationError(
            "Cannot send a message to yourself.".to_string(),
        ));
    }
    if User::find_by_id(&state.pool, req.recipient_id).await?.is_none() {
        return Err(AppError::NotFound("Recipient not found.".to_string()));
    }

    let message =
        Message::send(&state.pool, user.user_id, req.recipient_id, req.body.trim()).await?;
    Ok(created(message, "Message sent").into_response())
}

/// Fetching a conversation marks the messages received from the other party
/// as read.
pub async fn get_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(other_user_id): Path<Uuid>,
) -> AppResult<Response> {
    let messages = Message::conversation(&state.pool, user.user_id, other_user_id).await?;
    Message::mark_read(&state.pool, user.user_id, other_user_id).await?;
    Ok(success(messages, "Conversation retrieved").into_response())
}
