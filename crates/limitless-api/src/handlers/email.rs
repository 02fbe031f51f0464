//! Transactional email send and the inbound webhook

use crate::{
    error::{ApiError, ApiResult},
    extractors::{AdminSession, ValidatedJson},
    state::AppState,
};
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use limitless_core::types::{EmailRequest, EmailSent, InboundAck};
use limitless_mailer::EmailMessage;
use std::sync::Arc;
use tracing::{info, warn};

/// Send an email on behalf of a signed-in admin
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    session: Option<AdminSession>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> ApiResult<Json<EmailSent>> {
    let message = EmailMessage::from_request(&request, &state.config.mailer.default_from);
    let receipt = state.mailer.send(&message).await?;

    info!(
        id = %receipt.id,
        provider = state.mailer.name(),
        sender = ?session.map(|AdminSession(s)| s.email),
        "Email sent"
    );
    Ok(Json(EmailSent {
        message: "Email sent successfully".to_string(),
        id: receipt.id,
    }))
}

/// Acknowledge an inbound-email webhook delivery
///
/// The payload is only checked for being JSON; signature verification and
/// mapping to conversations happen elsewhere.
pub async fn inbound_email(body: Bytes) -> ApiResult<Json<InboundAck>> {
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(_) => {
            info!(bytes = body.len(), "Inbound email acknowledged");
            Ok(Json(InboundAck { ok: true }))
        }
        Err(e) => {
            warn!("Rejected inbound email payload: {}", e);
            Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_JSON",
                e.to_string(),
            ))
        }
    }
}
