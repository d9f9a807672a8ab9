use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};

use super::{parse_timestamp, SqliteStore};

/// A row in the `auth_sessions` table.
///
/// Rows are issued by the external identity provider; `user_email` may be
/// empty for sessions that have not yet been bound to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user_email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

pub trait SessionStore: Send + Sync + 'static {
    /// Look up a session by token, ignoring expired rows.
    fn get_active_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<AuthSession>, sqlx::Error>> + Send;

    /// Issue or refresh a session. Called by the sign-in service that shares
    /// this database; the server itself only reads sessions. Upserts on
    /// `token`.
    fn insert_session(
        &self,
        session: AuthSession,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Drop expired rows; returns how many were removed.
    fn purge_expired_sessions(&self) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SessionStore for SqliteStore {
    async fn get_active_session(&self, token: &str) -> Result<Option<AuthSession>, sqlx::Error> {
        let row: Option<(String, Option<String>, String)> = sqlx::query_as(
            "SELECT token, user_email, expires_at FROM auth_sessions \
             WHERE token = ?1 AND expires_at > ?2",
        )
        .bind(token)
        .bind(timestamp(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(token, user_email, expires_at)| AuthSession {
            token,
            user_email,
            expires_at: parse_timestamp(&expires_at, "auth_sessions.expires_at"),
        }))
    }

    async fn insert_session(&self, session: AuthSession) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_email, expires_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(token) DO UPDATE SET user_email = ?2, expires_at = ?3",
        )
        .bind(&session.token)
        .bind(&session.user_email)
        .bind(timestamp(session.expires_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?1")
            .bind(timestamp(Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(token: &str, email: Option<&str>, ttl: Duration) -> AuthSession {
        AuthSession {
            token: token.into(),
            user_email: email.map(str::to_owned),
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn active_session_is_found() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store
            .insert_session(session("t1", Some("a@x.com"), Duration::hours(1)))
            .await
            .unwrap();

        let found = store.get_active_session("t1").await.unwrap().unwrap();
        assert_eq!(found.user_email.as_deref(), Some("a@x.com"));
        assert!(store.get_active_session("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_is_ignored_and_purged() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store
            .insert_session(session("old", Some("a@x.com"), Duration::hours(-1)))
            .await
            .unwrap();
        store
            .insert_session(session("new", None, Duration::hours(1)))
            .await
            .unwrap();

        assert!(store.get_active_session("old").await.unwrap().is_none());
        assert_eq!(store.purge_expired_sessions().await.unwrap(), 1);
        let fresh = store.get_active_session("new").await.unwrap().unwrap();
        assert_eq!(fresh.user_email, None);
    }

    #[tokio::test]
    async fn reissuing_a_token_binds_the_user() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store
            .insert_session(session("t1", None, Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert_session(session("t1", Some("a@x.com"), Duration::hours(2)))
            .await
            .unwrap();

        let found = store.get_active_session("t1").await.unwrap().unwrap();
        assert_eq!(found.user_email.as_deref(), Some("a@x.com"));
    }
}
