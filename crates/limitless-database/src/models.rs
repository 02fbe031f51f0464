//! Database models for the Limitless back-office

use chrono::{DateTime, Utc};
use limitless_core::{
    entity::{EntityKind, Fields, ManagedEntity},
    session::{Role, Session},
    types::SessionInfo,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// Row of any managed collection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntityRow {
    /// Unique identifier
    pub id: Uuid,

    /// Attribute values
    pub fields: Json<Fields>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl EntityRow {
    /// Attach the collection's kind
    #[must_use]
    pub fn into_entity(self, kind: EntityKind) -> ManagedEntity {
        ManagedEntity {
            id: self.id,
            kind,
            fields: self.fields.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database model for analytics events
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalyticsEventDb {
    /// Unique identifier
    pub id: Uuid,

    /// Event type
    pub event_type: String,

    /// Free-form payload
    pub event_data: serde_json::Value,

    /// Page URL
    pub page_url: Option<String>,

    /// Reported user agent
    pub user_agent: Option<String>,

    /// Visitor session
    pub session_id: Option<String>,

    /// Client address
    pub ip_address: Option<String>,

    /// Receive time
    pub created_at: DateTime<Utc>,
}

/// Database model for admin sessions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSessionDb {
    /// Unique identifier
    pub id: Uuid,

    /// Signed-in user
    pub user_id: Uuid,

    /// User's email
    pub email: String,

    /// Stored role name
    pub role: String,

    /// MD5 hex digest of the bearer token
    pub token_hash: String,

    /// Whether the session may still be used
    pub is_active: bool,

    /// Address the session was created from
    pub ip_address: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Expiry time
    pub expires_at: DateTime<Utc>,

    /// Last authenticated request
    pub last_seen_at: Option<DateTime<Utc>>,

    /// When the session was revoked
    pub terminated_at: Option<DateTime<Utc>>,

    /// Why the session was revoked
    pub termination_reason: Option<String>,
}

impl AdminSessionDb {
    /// Parsed role; unknown role names fall back to the least privileged role
    #[must_use]
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }

    /// Public identity of the session
    #[must_use]
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role(),
            expires_at: self.expires_at,
        }
    }

    /// Session value carrying the presented bearer token
    #[must_use]
    pub fn into_session(self, token: String) -> Session {
        let role = self.role();
        Session {
            user_id: self.user_id,
            email: self.email,
            role,
            token,
            expires_at: self.expires_at,
        }
    }
}
