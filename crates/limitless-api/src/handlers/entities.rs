//! Generic admin CRUD over the managed collections

use crate::{
    error::{ApiError, ApiResult},
    extractors::JsonBody,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use limitless_core::{
    EntityKind, FieldValue, Fields, ManagedEntity, ValidationMode,
    types::{EntityPage, PaginationInfo},
    utils::{clamp_page, normalize_email, sanitize_search_term},
};
use limitless_database::{EntityFilter, EntityQueries};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Query parameters for listing a collection
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page size
    pub limit: Option<i64>,
    /// Page offset
    pub offset: Option<i64>,
    /// Value of the collection's status field
    pub status: Option<String>,
    /// Free-text search
    pub q: Option<String>,
}

/// Resolve the `:collection` path segment
fn resolve_kind(segment: &str) -> ApiResult<EntityKind> {
    EntityKind::from_route_segment(segment).ok_or_else(|| {
        ApiError::new(
            StatusCode::NOT_FOUND,
            "UNKNOWN_COLLECTION",
            format!("Unknown collection '{segment}'"),
        )
    })
}

/// Check a status filter against the kind's status field
fn status_filter(kind: EntityKind, status: Option<&str>) -> ApiResult<Option<String>> {
    let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let Some(field) = kind.status_field() else {
        return Err(ApiError::bad_request(format!(
            "{} cannot be filtered by status",
            kind.label()
        )));
    };

    let probe = Fields::from([(field.to_string(), FieldValue::from(status))]);
    kind.validate(&probe, ValidationMode::Update)?;
    Ok(Some(status.to_string()))
}

/// Normalise values the store matches on
fn normalize_fields(kind: EntityKind, mut fields: Fields) -> Fields {
    if kind == EntityKind::User {
        if let Some(FieldValue::Text(email)) = fields.get_mut("email") {
            *email = normalize_email(email);
        }
    }
    fields
}

/// List one page of a collection
pub async fn list_entities(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<EntityPage>> {
    let kind = resolve_kind(&collection)?;
    let status = status_filter(kind, query.status.as_deref())?;
    let search = query.q.as_deref().and_then(sanitize_search_term);
    let (limit, offset) = clamp_page(
        query.limit,
        query.offset,
        state.config.api.default_page_size,
        state.config.api.max_page_size,
    );

    let filter = EntityFilter {
        status: status.as_deref(),
        search: search.as_deref(),
        limit,
        offset,
    };

    let rows = EntityQueries::list(&state.pool, kind, &filter).await?;
    let total = EntityQueries::count(&state.pool, kind, &filter).await?;
    info!("Listed {} of {} {}", rows.len(), total, kind);

    Ok(Json(EntityPage {
        items: rows.into_iter().map(|row| row.into_entity(kind)).collect(),
        pagination: PaginationInfo::new(total, limit, offset),
    }))
}

/// Fetch one record
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<ManagedEntity>> {
    let kind = resolve_kind(&collection)?;
    let row = EntityQueries::find_by_id(&state.pool, kind, id).await?;
    Ok(Json(row.into_entity(kind)))
}

/// Create a record from a field mapping
pub async fn create_entity(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    JsonBody(fields): JsonBody<Fields>,
) -> ApiResult<(StatusCode, Json<ManagedEntity>)> {
    let kind = resolve_kind(&collection)?;
    kind.validate(&fields, ValidationMode::Create)?;

    let row = EntityQueries::insert(&state.pool, kind, &normalize_fields(kind, fields)).await?;
    info!("Created {} {}", kind, row.id);
    Ok((StatusCode::CREATED, Json(row.into_entity(kind))))
}

/// Apply a partial field mapping; `null` clears a field
pub async fn update_entity(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, Uuid)>,
    JsonBody(fields): JsonBody<Fields>,
) -> ApiResult<Json<ManagedEntity>> {
    let kind = resolve_kind(&collection)?;
    if fields.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    kind.validate(&fields, ValidationMode::Update)?;

    let row = EntityQueries::update(&state.pool, kind, id, &normalize_fields(kind, fields)).await?;
    info!("Updated {} {}", kind, id);
    Ok(Json(row.into_entity(kind)))
}

/// Delete a record
pub async fn delete_entity(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let kind = resolve_kind(&collection)?;
    EntityQueries::delete(&state.pool, kind, id).await?;
    info!("Deleted {} {}", kind, id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use limitless_core::fields;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("leads", EntityKind::Lead)]
    #[case("portfolio", EntityKind::PortfolioItem)]
    #[case("seo", EntityKind::SeoSetting)]
    fn test_resolve_known_collections(#[case] segment: &str, #[case] kind: EntityKind) {
        assert_eq!(resolve_kind(segment).unwrap(), kind);
    }

    #[test]
    fn test_resolve_unknown_collection_is_not_found() {
        let err = resolve_kind("invoices").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.code, "UNKNOWN_COLLECTION");
    }

    #[test]
    fn test_status_filter_accepts_known_status() {
        assert_eq!(
            status_filter(EntityKind::Lead, Some("qualified")).unwrap(),
            Some("qualified".to_string())
        );
        assert_eq!(
            status_filter(EntityKind::User, Some("admin")).unwrap(),
            Some("admin".to_string())
        );
    }

    #[test]
    fn test_status_filter_blank_is_ignored() {
        assert_eq!(status_filter(EntityKind::Page, Some("  ")).unwrap(), None);
        assert_eq!(status_filter(EntityKind::Page, None).unwrap(), None);
    }

    #[test]
    fn test_status_filter_rejects_kind_without_status() {
        let err = status_filter(EntityKind::Page, Some("published")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "Pages cannot be filtered by status");
    }

    #[test]
    fn test_status_filter_rejects_unknown_status() {
        let err = status_filter(EntityKind::Lead, Some("archived")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_user_email_is_normalized() {
        let fields = normalize_fields(
            EntityKind::User,
            fields! { "email" => " Ada@Example.COM ", "role" => "admin" },
        );
        assert_eq!(fields["email"], FieldValue::from("ada@example.com"));
    }

    #[test]
    fn test_lead_email_is_left_alone() {
        let fields = normalize_fields(EntityKind::Lead, fields! { "email" => "Ada@Example.com" });
        assert_eq!(fields["email"], FieldValue::from("Ada@Example.com"));
    }
}
