//! Routes nested under `/api`, consumed by the browser chat client.
//!
//! Every handler here receives the caller's
//! [`RequestContext`](docchat_app_core::RequestContext) from the identity
//! middleware.

pub mod chat;
pub mod history;

use crate::state::AppState;
use utoipa::OpenApi;

use axum::Router;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chat::router())
        .merge(history::router())
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = chat::ChatApi::openapi();
    spec.merge(history::HistoryApi::openapi());
    spec
}
