//! Resolves the caller once per request and stores the resulting
//! [`RequestContext`] as a request extension for handlers to pick up.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use docchat_app_core::RequestContext;

use crate::error::ServerError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "docchat_session";

pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = session_token(req.headers());
    let ctx: RequestContext = match state.identity.resolve(token.as_deref()).await {
        Ok(ctx) => ctx,
        Err(e) => return ServerError::from(e).into_response(),
    };
    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Bearer token from `Authorization`, else the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}
