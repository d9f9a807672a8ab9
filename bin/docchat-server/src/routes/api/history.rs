use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use docchat_app_core::RequestContext;
use docchat_types::Chat;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_history), components(schemas(Chat)))]
pub struct HistoryApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/history", get(list_history))
}

/// The caller's chats, newest first (`GET /api/history`).
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "Chats of the caller", body = [Chat]),
        (status = 401, description = "Not signed in"),
    )
)]
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Chat>>, ServerError> {
    Ok(Json(state.chats.list_history(&ctx).await?))
}
