//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use docchat_app_core::entities::SqliteStore;
use docchat_app_core::identity::IdentityProvider;
use docchat_app_core::services::ChatService;

use crate::config::Config;

/// State shared across all HTTP handlers and middleware.
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Backing store, used directly only for health checks.
    pub store: Arc<SqliteStore>,
    /// Chat workflows over the SQLite store.
    pub chats: Arc<ChatService<SqliteStore>>,
    /// Resolves the request credential into a caller identity.
    pub identity: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
