//! Request and response types shared by the API server and the admin client

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entity::ManagedEntity;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message, shown verbatim by the admin client
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    /// Additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Build an error body without details
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }
}

/// Pagination information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Total number of matching records
    pub total: i64,
    /// Page size used
    pub limit: i64,
    /// Offset used
    pub offset: i64,
    /// Whether there are more results
    pub has_next: bool,
    /// Whether there are previous results
    pub has_prev: bool,
    /// Next page offset
    pub next_offset: Option<i64>,
    /// Previous page offset
    pub prev_offset: Option<i64>,
}

impl PaginationInfo {
    /// Compute pagination for one page of `total` records
    #[must_use]
    pub fn new(total: i64, limit: i64, offset: i64) -> Self {
        let has_next = offset + limit < total;
        let has_prev = offset > 0;
        Self {
            total,
            limit,
            offset,
            has_next,
            has_prev,
            next_offset: has_next.then_some(offset + limit),
            prev_offset: has_prev.then(|| (offset - limit).max(0)),
        }
    }
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// Pagination info
    pub pagination: PaginationInfo,
}

/// Entity page as returned by the admin API
pub type EntityPage = ListResponse<ManagedEntity>;

/// Lead pipeline state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Not yet handled
    #[default]
    New,
    /// First contact made
    Contacted,
    /// Confirmed as a real opportunity
    Qualified,
    /// Did not convert
    Lost,
    /// Became a client
    Converted,
}

impl LeadStatus {
    /// Stored name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Lost => "lost",
            Self::Converted => "converted",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public contact-form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LeadSubmission {
    /// Sender's name
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Sender's email
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Subject line
    #[validate(length(min = 1, max = 300, message = "Subject is required"))]
    pub subject: String,
    /// Message body
    #[validate(length(min = 1, max = 10_000, message = "Message is required"))]
    pub message: String,
    /// Company name
    #[validate(length(max = 200))]
    pub company: Option<String>,
    /// Phone number
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Originating form, defaults to `contact_form`
    #[validate(length(max = 100))]
    pub source: Option<String>,
}

/// Response to an accepted lead submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadCreated {
    /// Confirmation message
    pub message: String,
    /// Identifier of the stored lead
    pub lead_id: Uuid,
}

/// Bulk action on leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    /// Delete every selected lead
    Delete,
    /// Set the status of every selected lead
    Status,
}

/// Bulk lead request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BulkLeadRequest {
    /// Selected leads
    #[validate(length(min = 1, max = 500, message = "Select at least one lead"))]
    pub ids: Vec<Uuid>,
    /// Action to apply
    pub action: BulkAction,
    /// New status for [`BulkAction::Status`]
    #[serde(default, alias = "value")]
    pub status: Option<LeadStatus>,
}

/// Result of a bulk lead request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// Number of leads affected
    pub affected: u64,
}

/// Analytics event posted by the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalyticsEvent {
    /// Event type, e.g. `page_view`
    #[serde(alias = "eventType")]
    #[validate(length(min = 1, max = 100, message = "Event type is required"))]
    pub event_type: String,
    /// Free-form event payload
    #[serde(default, alias = "eventData")]
    pub event_data: serde_json::Value,
    /// Page the event happened on
    #[serde(default, alias = "pageUrl")]
    #[validate(length(max = 2048))]
    pub page_url: Option<String>,
    /// Reported user agent
    #[serde(default, alias = "userAgent")]
    #[validate(length(max = 1024))]
    pub user_agent: Option<String>,
    /// Visitor session identifier
    #[serde(default, alias = "sessionId")]
    #[validate(length(max = 255))]
    pub session_id: Option<String>,
}

/// Confirmation for accepted analytics events and other fire-and-forget calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    /// Always true
    pub success: bool,
}

/// Transactional email request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EmailRequest {
    /// Recipient address
    #[validate(email(message = "Recipient must be a valid email"))]
    pub to: String,
    /// Sender, e.g. `Name <addr@domain>`; the configured default when empty
    pub from: String,
    /// Subject line
    #[validate(length(min = 1, max = 998, message = "Subject is required"))]
    pub subject: String,
    /// HTML body
    #[serde(alias = "html", alias = "htmlBody")]
    #[validate(length(min = 1, message = "HTML body is required"))]
    pub html_body: String,
}

/// Response to an accepted email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSent {
    /// Confirmation message
    pub message: String,
    /// Provider message identifier
    pub id: String,
}

/// Acknowledgement of an inbound webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundAck {
    /// Always true
    pub ok: bool,
}

/// Identity behind the current admin session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Signed-in user
    pub user_id: Uuid,
    /// User's email
    pub email: String,
    /// User's role
    pub role: crate::session::Role,
    /// Expiry time
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(100, 50, 0, true, false, Some(50), None)]
    #[case(100, 50, 50, false, true, None, Some(0))]
    #[case(100, 30, 20, true, true, Some(50), Some(0))]
    #[case(0, 50, 0, false, false, None, None)]
    fn test_pagination(
        #[case] total: i64,
        #[case] limit: i64,
        #[case] offset: i64,
        #[case] has_next: bool,
        #[case] has_prev: bool,
        #[case] next_offset: Option<i64>,
        #[case] prev_offset: Option<i64>,
    ) {
        let page = PaginationInfo::new(total, limit, offset);
        assert_eq!(page.has_next, has_next);
        assert_eq!(page.has_prev, has_prev);
        assert_eq!(page.next_offset, next_offset);
        assert_eq!(page.prev_offset, prev_offset);
    }

    #[test]
    fn test_lead_submission_requires_fields() {
        let submission: LeadSubmission =
            serde_json::from_str(r#"{"name": "Ada", "email": "ada@example.com"}"#).unwrap();

        let errors = submission.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("subject"));
        assert!(fields.contains_key("message"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_email_request_accepts_html_alias() {
        let request: EmailRequest = serde_json::from_str(
            r#"{"to": "ada@example.com", "from": "", "subject": "Hi", "html": "<p>Hi</p>"}"#,
        )
        .unwrap();

        assert_eq!(request.html_body, "<p>Hi</p>");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_email_request_missing_body_is_invalid() {
        let request: EmailRequest =
            serde_json::from_str(r#"{"to": "ada@example.com", "subject": "Hi"}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_analytics_event_accepts_camel_case() {
        let event: AnalyticsEvent = serde_json::from_str(
            r#"{"eventType": "page_view", "eventData": {"path": "/"}, "pageUrl": "/", "sessionId": "s1"}"#,
        )
        .unwrap();

        assert_eq!(event.event_type, "page_view");
        assert_eq!(event.page_url.as_deref(), Some("/"));
        assert_eq!(event.session_id.as_deref(), Some("s1"));
        assert!(event.user_agent.is_none());
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_bulk_request_shape() {
        let request: BulkLeadRequest = serde_json::from_str(&format!(
            r#"{{"ids": ["{}"], "action": "status", "status": "qualified"}}"#,
            Uuid::nil()
        ))
        .unwrap();

        assert_eq!(request.action, BulkAction::Status);
        assert_eq!(request.status, Some(LeadStatus::Qualified));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let body = serde_json::to_string(&ErrorResponse::new("Not found", "NOT_FOUND")).unwrap();
        assert_eq!(body, r#"{"error":"Not found","code":"NOT_FOUND"}"#);
    }
}
