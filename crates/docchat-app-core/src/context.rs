//! Per-request caller identity.
//!
//! A [`RequestContext`] is resolved once at the edge of each request and
//! handed to every workflow call; nothing below the edge looks identity up
//! on its own.

use crate::error::AppCoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
}

/// An authenticated session. `user` is empty when the identity provider
/// issued a session that is not yet bound to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session: Option<Session>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn for_user(email: impl Into<String>) -> Self {
        Self {
            session: Some(Session {
                user: Some(User {
                    email: email.into(),
                }),
            }),
        }
    }

    /// A session with no populated user.
    pub fn unbound_session() -> Self {
        Self {
            session: Some(Session { user: None }),
        }
    }

    pub fn require_session(&self) -> Result<&Session, AppCoreError> {
        self.session.as_ref().ok_or(AppCoreError::Unauthenticated)
    }

    pub fn require_user(&self) -> Result<&User, AppCoreError> {
        self.require_session()?
            .user
            .as_ref()
            .ok_or(AppCoreError::Unauthenticated)
    }
}
