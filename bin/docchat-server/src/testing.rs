//! Fixtures shared by the router tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use docchat_app_core::entities::{AuthSession, SessionStore, SqliteStore};
use docchat_app_core::generation::{GenerationError, GenerationRequest, Generator, TextStream};
use docchat_app_core::identity::StoreIdentityProvider;
use docchat_app_core::services::ChatService;
use futures::StreamExt;
use http_body_util::BodyExt;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

pub struct ScriptedGenerator {
    chunks: Vec<&'static str>,
    fail_to_start: bool,
}

impl ScriptedGenerator {
    pub fn replying(chunks: &[&'static str]) -> Self {
        Self {
            chunks: chunks.to_vec(),
            fail_to_start: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            chunks: Vec::new(),
            fail_to_start: true,
        }
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<TextStream, GenerationError> {
        if self.fail_to_start {
            return Err(GenerationError::Provider("provider unreachable".into()));
        }
        let items: Vec<Result<String, GenerationError>> =
            self.chunks.iter().map(|c| Ok(c.to_string())).collect();
        Ok(futures::stream::iter(items).boxed())
    }
}

fn config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        log_level: "info".into(),
        log_json: false,
        log_dir: None,
        cors_allowed_origins: None,
        enable_swagger: false,
        model: "test-model".into(),
        context_chunks: 10,
    }
}

/// Router over an in-memory store with three sessions:
/// `a-token` (a@x.com), `b-token` (b@x.com) and `unbound-token` (no user).
pub async fn seeded_app(generator: ScriptedGenerator) -> (Router, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::connect_in_memory().await.unwrap());
    for (token, email) in [
        ("a-token", Some("a@x.com")),
        ("b-token", Some("b@x.com")),
        ("unbound-token", None),
    ] {
        store
            .insert_session(AuthSession {
                token: token.into(),
                user_email: email.map(str::to_owned),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .await
            .unwrap();
    }

    let state = Arc::new(AppState {
        config: Arc::new(config()),
        store: Arc::clone(&store),
        chats: Arc::new(ChatService::new(Arc::clone(&store), Arc::new(generator))),
        identity: Arc::new(StoreIdentityProvider::new(Arc::clone(&store))),
    });
    (routes::build(state), store)
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, Body::empty())
}

pub async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
