//! Conversations and messages. Everything here requires a token; access is
//! always membership-checked, and a missing membership reads as a missing
//! conversation.

use crate::error::ApiError;
use crate::middleware::auth::{require_auth, AuthUser};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use unigig_core::FieldError;
use unigig_store::models::{ConversationSummary, MessageView};
use uuid::Uuid;

use super::{non_empty, parse_id};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(start_conversation),
        )
        .route("/{conversation_id}", get(list_messages))
        .route("/", post(send_message))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

async fn list_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let conversations = state
        .store
        .list_conversations(user.id)
        .await
        .map_err(|e| ApiError::internal("Error fetching conversations", e))?;
    Ok(Json(conversations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartConversationBody {
    participant_id: Option<String>,
}

async fn start_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StartConversationBody>,
) -> Result<impl IntoResponse, ApiError> {
    let participant_id = parse_id(&body.participant_id).ok_or_else(|| {
        ApiError::Validation(vec![FieldError::new(
            "participantId",
            "Participant is required",
        )])
    })?;
    if participant_id == user.id {
        return Err(ApiError::Validation(vec![FieldError::new(
            "participantId",
            "Cannot start a conversation with yourself",
        )]));
    }

    state
        .store
        .find_user_by_id(participant_id)
        .await
        .map_err(|e| ApiError::internal("Error creating conversation", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let (row, created) = state
        .store
        .ensure_conversation(user.id, participant_id)
        .await
        .map_err(|e| ApiError::internal("Error creating conversation", e))?;
    let view = state
        .store
        .conversation_view(&row)
        .await
        .map_err(|e| ApiError::internal("Error creating conversation", e))?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)))
}

async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    state
        .store
        .conversation_for_member(conversation_id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error fetching messages", e))?
        .ok_or_else(|| ApiError::not_found("Conversation not found"))?;

    let messages = state
        .store
        .messages_for_conversation(conversation_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching messages", e))?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody {
    content: Option<String>,
    conversation_id: Option<String>,
}

async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<MessageView>), ApiError> {
    let mut errors = Vec::new();
    let content = non_empty(&body.content);
    if content.is_none() {
        errors.push(FieldError::new("content", "Content is required"));
    }
    let conversation_id = parse_id(&body.conversation_id);
    if conversation_id.is_none() {
        errors.push(FieldError::new("conversationId", "Conversation is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let conversation_id = conversation_id.unwrap();

    state
        .store
        .conversation_for_member(conversation_id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error sending message", e))?
        .ok_or_else(|| ApiError::not_found("Conversation not found"))?;

    let message = state
        .store
        .create_message(conversation_id, user.id, content.unwrap())
        .await
        .map_err(|e| ApiError::internal("Error sending message", e))?;
    Ok((StatusCode::CREATED, Json(message)))
}
