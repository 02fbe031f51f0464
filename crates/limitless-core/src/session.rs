//! Signed-in session context
//!
//! The session is created on sign-in, torn down on sign-out and handed to every
//! component that needs it. It is never read from a global.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use uuid::Uuid;

use crate::Error;

/// Back-office role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registered site user
    User,
    /// Client with portal access
    Client,
    /// Staff member without admin rights
    Employee,
    /// Administrator
    Admin,
    /// Administrator who can manage other administrators
    SuperAdmin,
}

impl Role {
    /// Whether the role may use the admin area
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Stored name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Client => "client",
            Self::Employee => "employee",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "client" => Ok(Self::Client),
            "employee" => Ok(Self::Employee),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(Error::validation("role", format!("unknown role '{other}'"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated back-office session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in user
    pub user_id: Uuid,
    /// User's email address
    pub email: String,
    /// User's role
    pub role: Role,
    /// Bearer credential presented to the API
    pub token: String,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Shared handle to the current session, if any
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    /// Create a signed-out context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` as the current session
    pub fn sign_in(&self, session: Session) {
        tracing::info!(user_id = %session.user_id, role = %session.role, "Signed in");
        *self.inner.write() = Some(session);
    }

    /// Drop the current session, returning it
    pub fn sign_out(&self) -> Option<Session> {
        let previous = self.inner.write().take();
        if let Some(session) = &previous {
            tracing::info!(user_id = %session.user_id, "Signed out");
        }
        previous
    }

    /// Copy of the current session if it has not expired
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .as_ref()
            .filter(|session| !session.is_expired_at(Utc::now()))
            .cloned()
    }

    /// Bearer token of the current session
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    /// Whether a live session exists
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    /// Whether the live session may use the admin area
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current()
            .is_some_and(|session| session.role.is_admin())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn session(role: Role, ttl: Duration) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "admin@limitlessinfotech.com".to_string(),
            role,
            token: "tok_123".to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::SuperAdmin, true)]
    #[case(Role::Employee, false)]
    #[case(Role::Client, false)]
    #[case(Role::User, false)]
    fn test_admin_roles(#[case] role: Role, #[case] admin: bool) {
        assert_eq!(role.is_admin(), admin);
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }

    #[test]
    fn test_unknown_role() {
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_sign_in_and_out_are_shared_across_clones() {
        let context = SessionContext::new();
        let injected = context.clone();
        assert!(!injected.is_signed_in());

        context.sign_in(session(Role::Admin, Duration::hours(1)));
        assert!(injected.is_admin());
        assert_eq!(injected.bearer_token().as_deref(), Some("tok_123"));

        let previous = injected.sign_out();
        assert!(previous.is_some());
        assert!(!context.is_signed_in());
        assert!(context.bearer_token().is_none());
    }

    #[test]
    fn test_expired_session_is_not_current() {
        let context = SessionContext::new();
        context.sign_in(session(Role::Admin, Duration::seconds(-1)));

        assert!(context.current().is_none());
        assert!(!context.is_admin());
    }
}
