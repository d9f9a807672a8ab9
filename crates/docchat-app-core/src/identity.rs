//! Resolving a bearer token into a [`RequestContext`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::{RequestContext, Session, User};
use crate::entities::SessionStore;
use crate::error::AppCoreError;

/// Turns the credential presented with a request into a caller identity.
///
/// Unknown or expired tokens resolve to an anonymous context; only
/// infrastructure failures are errors.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: Option<&str>) -> Result<RequestContext, AppCoreError>;
}

/// Identity provider backed by the `auth_sessions` table.
pub struct StoreIdentityProvider<S> {
    store: Arc<S>,
}

impl<S> StoreIdentityProvider<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: SessionStore> IdentityProvider for StoreIdentityProvider<S> {
    async fn resolve(&self, token: Option<&str>) -> Result<RequestContext, AppCoreError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(RequestContext::anonymous());
        };

        match self.store.get_active_session(token).await? {
            Some(row) => Ok(RequestContext {
                session: Some(Session {
                    user: row
                        .user_email
                        .filter(|e| !e.is_empty())
                        .map(|email| User { email }),
                }),
            }),
            None => {
                debug!("unknown or expired session token");
                Ok(RequestContext::anonymous())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AuthSession, SqliteStore};
    use chrono::{Duration, Utc};

    async fn provider() -> StoreIdentityProvider<SqliteStore> {
        let store = Arc::new(SqliteStore::connect_in_memory().await.unwrap());
        for (token, email) in [("bound", Some("a@x.com")), ("unbound", None)] {
            store
                .insert_session(AuthSession {
                    token: token.into(),
                    user_email: email.map(str::to_owned),
                    expires_at: Utc::now() + Duration::hours(1),
                })
                .await
                .unwrap();
        }
        StoreIdentityProvider::new(store)
    }

    #[tokio::test]
    async fn missing_or_unknown_token_is_anonymous() {
        let p = provider().await;
        assert_eq!(p.resolve(None).await.unwrap(), RequestContext::anonymous());
        assert_eq!(p.resolve(Some("")).await.unwrap(), RequestContext::anonymous());
        assert_eq!(p.resolve(Some("forged")).await.unwrap(), RequestContext::anonymous());
    }

    #[tokio::test]
    async fn bound_token_resolves_user() {
        let p = provider().await;
        assert_eq!(
            p.resolve(Some("bound")).await.unwrap(),
            RequestContext::for_user("a@x.com")
        );
    }

    #[tokio::test]
    async fn unbound_token_resolves_session_without_user() {
        let p = provider().await;
        assert_eq!(
            p.resolve(Some("unbound")).await.unwrap(),
            RequestContext::unbound_session()
        );
    }
}
