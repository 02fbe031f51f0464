//! Public lead capture plus the admin-only bulk actions and CSV export

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ClientInfo, ValidatedJson},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use limitless_core::{
    EntityKind, Error, FieldValue, Fields, ManagedEntity, Result,
    types::{BulkAction, BulkLeadRequest, BulkOutcome, LeadCreated, LeadStatus, LeadSubmission},
    utils::{csv_safe, normalize_email},
};
use limitless_database::{EntityQueries, LeadQueries};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Source recorded when the form does not name one
const DEFAULT_SOURCE: &str = "contact_form";

/// Columns of the CSV export, in order
const EXPORT_COLUMNS: &[&str] = &[
    "name", "email", "company", "phone", "subject", "message", "source", "status",
];

/// Query parameters for the CSV export
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Only export leads in this status
    pub status: Option<LeadStatus>,
}

/// Build the stored field mapping for a public submission
fn submission_fields(submission: LeadSubmission, client: &ClientInfo) -> Fields {
    let mut fields = Fields::new();
    let mut put = |name: &str, value: String| {
        fields.insert(name.to_string(), FieldValue::Text(value));
    };

    put("name", submission.name.trim().to_string());
    put("email", normalize_email(&submission.email));
    put("subject", submission.subject.trim().to_string());
    put("message", submission.message);
    put(
        "source",
        submission
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
    );
    put("status", LeadStatus::New.as_str().to_string());
    put("ip_address", client.ip.clone());
    put(
        "user_agent",
        client
            .user_agent
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
    );
    for (name, value) in [("company", submission.company), ("phone", submission.phone)] {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            put(name, value);
        }
    }
    fields
}

/// Accept a contact-form submission
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    ValidatedJson(submission): ValidatedJson<LeadSubmission>,
) -> ApiResult<(StatusCode, Json<LeadCreated>)> {
    let fields = submission_fields(submission, &client);
    let row = EntityQueries::insert(&state.pool, EntityKind::Lead, &fields).await?;

    info!(lead_id = %row.id, ip = %client.ip, "Lead submitted");
    Ok((
        StatusCode::CREATED,
        Json(LeadCreated {
            message: "Lead submitted successfully".to_string(),
            lead_id: row.id,
        }),
    ))
}

/// Delete or re-status a selection of leads
pub async fn bulk_leads(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BulkLeadRequest>,
) -> ApiResult<Json<BulkOutcome>> {
    let affected = match request.action {
        BulkAction::Delete => LeadQueries::bulk_delete(&state.pool, &request.ids).await?,
        BulkAction::Status => {
            let status = request
                .status
                .ok_or_else(|| ApiError::bad_request("A status is required for this action"))?;
            LeadQueries::bulk_set_status(&state.pool, &request.ids, status).await?
        }
    };

    info!(action = ?request.action, affected, "Bulk lead action applied");
    Ok(Json(BulkOutcome { affected }))
}

/// Download leads as CSV
pub async fn export_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let rows = LeadQueries::export(&state.pool, query.status.map(LeadStatus::as_str)).await?;
    let leads: Vec<ManagedEntity> = rows
        .into_iter()
        .map(|row| row.into_entity(EntityKind::Lead))
        .collect();

    let body = leads_to_csv(&leads)?;
    info!("Exported {} leads", leads.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// Render leads as CSV, neutralising cells that spreadsheets would evaluate
fn leads_to_csv(leads: &[ManagedEntity]) -> Result<Vec<u8>> {
    let csv_error = |e: csv::Error| Error::Other(format!("CSV export failed: {e}"));
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header_row = vec!["id", "created_at"];
    header_row.extend_from_slice(EXPORT_COLUMNS);
    writer.write_record(&header_row).map_err(csv_error)?;

    for lead in leads {
        let mut record = vec![lead.id.to_string(), lead.created_at.to_rfc3339()];
        record.extend(EXPORT_COLUMNS.iter().map(|column| {
            lead.field(column)
                .map(|value| csv_safe(&value.display()))
                .unwrap_or_default()
        }));
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Other(format!("CSV export failed: {e}")))
}
