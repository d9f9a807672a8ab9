//! Chat routes: stream a reply, load a chat, delete a chat.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use docchat_app_core::RequestContext;
use docchat_types::{Chat, DeleteChatResponse, Message, Role};
use tracing::debug;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::schemas::chat::{ChatRequest, DeleteChatQuery};
use crate::state::AppState;
use crate::stream;

#[derive(OpenApi)]
#[openapi(
    paths(send_message, get_chat, delete_chat),
    components(schemas(ChatRequest, Chat, Message, Role, DeleteChatResponse))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(send_message))
        .route("/chat/delete", delete(delete_chat))
        .route("/chat/{id}", get(get_chat))
}

/// Generate the assistant's reply (`POST /api/chat`).
///
/// The reply is streamed as data-stream frames. Once generation completes the
/// chat is stored with the reply appended, under the caller's email.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply stream", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "No session"),
        (status = 500, description = "Generation could not start"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(req) = payload.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    ctx.require_session()?;
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    debug!(chat_id = %req.id, turns = req.messages.len(), "chat message received");
    let reply = state.chats.stream_reply(&ctx, req.into()).await?;
    Ok(stream::into_response(reply))
}

/// Load one of the caller's chats (`GET /api/chat/{id}`).
#[utoipa::path(
    get,
    path = "/api/chat/{id}",
    tag = "chat",
    params(("id" = String, Path, description = "Chat to load")),
    responses(
        (status = 200, description = "Chat", body = Chat),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Chat belongs to someone else"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Chat>, ServerError> {
    Ok(Json(state.chats.get_chat(&ctx, &id).await?))
}

/// Delete one of the caller's chats (`DELETE /api/chat/delete?id=`).
#[utoipa::path(
    delete,
    path = "/api/chat/delete",
    tag = "chat",
    params(DeleteChatQuery),
    responses(
        (status = 200, description = "Chat deleted", body = DeleteChatResponse),
        (status = 400, description = "Chat ID is required"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Chat belongs to someone else"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<DeleteChatQuery>,
) -> Result<Json<DeleteChatResponse>, ServerError> {
    state.chats.delete_chat(&ctx, query.id.as_deref()).await?;
    Ok(Json(DeleteChatResponse { success: true }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
