//! Pool message board API endpoints

use api_types::message::{
    MessageKind as ApiKind, MessageList, MessageListResponse, MessageNew, MessageView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::MessageKind) -> ApiKind {
    match kind {
        engine::MessageKind::User => ApiKind::User,
        engine::MessageKind::System => ApiKind::System,
    }
}

pub(crate) fn message_view(message: engine::Message) -> MessageView {
    MessageView {
        id: message.id,
        sender_id: message.sender_id,
        content: message.content,
        kind: map_kind(message.kind),
        created_at: message.created_at,
    }
}

/// Handle requests for posting to the pool board.
pub async fn send(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
    Json(payload): Json<MessageNew>,
) -> Result<Json<MessageView>, ServerError> {
    let message = state
        .engine
        .post_message(pool_id, &payload.content, &user.id, Utc::now())
        .await?;

    Ok(Json(message_view(message)))
}

/// Handle requests for reading the pool board, latest messages in
/// chronological order.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(pool_id): Path<Uuid>,
    Query(params): Query<MessageList>,
) -> Result<Json<MessageListResponse>, ServerError> {
    let messages = state
        .engine
        .pool_messages(pool_id, params.limit, &user.id)
        .await?;

    Ok(Json(MessageListResponse {
        messages: messages.into_iter().map(message_view).collect(),
    }))
}
