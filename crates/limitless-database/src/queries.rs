//! Database query operations for the Limitless back-office

use crate::models::{AdminSessionDb, EntityRow};
use limitless_core::{
    Error, Result,
    entity::{EntityKind, Fields},
    types::{AnalyticsEvent, LeadStatus},
};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

/// Filters for listing a collection
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityFilter<'a> {
    /// Value of the kind's status field (`status` or `role`)
    pub status: Option<&'a str>,
    /// Escaped `LIKE` term matched against every field value
    pub search: Option<&'a str>,
    /// Page size
    pub limit: i64,
    /// Page offset
    pub offset: i64,
}

/// Map a write error, turning unique violations into conflicts
fn write_error(kind: EntityKind, err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict {
            message: format!("A record in {kind} with the same unique value already exists"),
        },
        sqlx::Error::RowNotFound => Error::NotFound {
            resource: kind.to_string(),
        },
        _ => Error::Database(err.to_string()),
    }
}

// Search term $2 against field values only, never field names.
const SEARCH_CLAUSE: &str = "($2::text IS NULL OR EXISTS (\
    SELECT 1 FROM jsonb_each_text(fields) AS field \
    WHERE field.value ILIKE '%' || $2 || '%'))";

// Shared `WHERE` clause for list and count: $1 status, $2 search term.
// Kinds without a status field only match when no status is requested.
fn filter_clause(kind: EntityKind) -> String {
    let status = kind.status_field().map_or_else(
        || "$1::text IS NULL".to_string(),
        |field| format!("($1::text IS NULL OR fields->>'{field}' = $1)"),
    );
    format!("WHERE {status} AND {SEARCH_CLAUSE}")
}

/// Operations shared by every managed collection
///
/// Table names come from [`EntityKind::collection`], never from user input.
pub struct EntityQueries;

impl EntityQueries {
    /// List one page of a collection, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        pool: &PgPool,
        kind: EntityKind,
        filter: &EntityFilter<'_>,
    ) -> Result<Vec<EntityRow>> {
        let query = format!(
            "SELECT id, fields, created_at, updated_at FROM {} {} \
             ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            kind.collection(),
            filter_clause(kind)
        );

        sqlx::query_as::<_, EntityRow>(&query)
            .bind(filter.status)
            .bind(filter.search)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Count the records matching `filter`, ignoring its page bounds
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(pool: &PgPool, kind: EntityKind, filter: &EntityFilter<'_>) -> Result<i64> {
        let query = format!(
            "SELECT COUNT(*) FROM {} {}",
            kind.collection(),
            filter_clause(kind)
        );

        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.status)
            .bind(filter.search)
            .fetch_one(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Find a record by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the record is not found.
    pub async fn find_by_id(pool: &PgPool, kind: EntityKind, id: Uuid) -> Result<EntityRow> {
        let query = format!(
            "SELECT id, fields, created_at, updated_at FROM {} WHERE id = $1",
            kind.collection()
        );

        sqlx::query_as::<_, EntityRow>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => Error::NotFound {
                    resource: format!("{kind}/{id}"),
                },
                _ => Error::Database(e.to_string()),
            })
    }

    /// Insert a record
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] on a unique violation, or a database error.
    pub async fn insert(pool: &PgPool, kind: EntityKind, fields: &Fields) -> Result<EntityRow> {
        let query = format!(
            "INSERT INTO {} (fields) VALUES (jsonb_strip_nulls($1)) \
             RETURNING id, fields, created_at, updated_at",
            kind.collection()
        );

        let row = sqlx::query_as::<_, EntityRow>(&query)
            .bind(Json(fields))
            .fetch_one(pool)
            .await
            .map_err(|e| write_error(kind, e))?;

        tracing::debug!(%kind, id = %row.id, "Inserted record");
        Ok(row)
    }

    /// Merge `changes` into a record; `null` values remove the field
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the record does not exist, [`Error::Conflict`]
    /// on a unique violation, or a database error.
    pub async fn update(
        pool: &PgPool,
        kind: EntityKind,
        id: Uuid,
        changes: &Fields,
    ) -> Result<EntityRow> {
        let query = format!(
            "UPDATE {} SET fields = jsonb_strip_nulls(fields || $2), updated_at = NOW() \
             WHERE id = $1 RETURNING id, fields, created_at, updated_at",
            kind.collection()
        );

        sqlx::query_as::<_, EntityRow>(&query)
            .bind(id)
            .bind(Json(changes))
            .fetch_one(pool)
            .await
            .map_err(|e| match write_error(kind, e) {
                Error::NotFound { .. } => Error::NotFound {
                    resource: format!("{kind}/{id}"),
                },
                other => other,
            })
    }

    /// Delete a record
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the record does not exist, or a database error.
    pub async fn delete(pool: &PgPool, kind: EntityKind, id: Uuid) -> Result<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.collection());

        let result = sqlx::query(&query)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound {
                resource: format!("{kind}/{id}"),
            });
        }
        Ok(())
    }
}

/// Lead-specific operations
pub struct LeadQueries;

impl LeadQueries {
    /// Delete every lead in `ids`, returning how many existed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn bulk_delete(pool: &PgPool, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Set the status of every lead in `ids`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn bulk_set_status(pool: &PgPool, ids: &[Uuid], status: LeadStatus) -> Result<u64> {
        let query = r"
            UPDATE leads
            SET fields = jsonb_set(fields, '{status}', to_jsonb($2::text)),
                updated_at = NOW()
            WHERE id = ANY($1)
        ";

        let result = sqlx::query(query)
            .bind(ids)
            .bind(status.as_str())
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Every lead matching `status`, oldest first, for export
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn export(pool: &PgPool, status: Option<&str>) -> Result<Vec<EntityRow>> {
        let query = r"
            SELECT id, fields, created_at, updated_at FROM leads
            WHERE ($1::text IS NULL OR fields->>'status' = $1)
            ORDER BY created_at
        ";

        sqlx::query_as::<_, EntityRow>(query)
            .bind(status)
            .fetch_all(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}

/// Analytics event operations
pub struct AnalyticsQueries;

impl AnalyticsQueries {
    /// Record one event
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insert(
        pool: &PgPool,
        event: &AnalyticsEvent,
        ip_address: Option<&str>,
    ) -> Result<Uuid> {
        let query = r"
            INSERT INTO analytics_events (
                event_type, event_data, page_url, user_agent, session_id, ip_address
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
        ";

        sqlx::query_scalar::<_, Uuid>(query)
            .bind(&event.event_type)
            .bind(&event.event_data)
            .bind(&event.page_url)
            .bind(&event.user_agent)
            .bind(&event.session_id)
            .bind(ip_address)
            .fetch_one(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}

/// Admin session operations
pub struct SessionQueries;

impl SessionQueries {
    /// Find a live session by token hash
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if no active, unexpired session matches.
    pub async fn find_active(pool: &PgPool, token_hash: &str) -> Result<AdminSessionDb> {
        let query = r"
            SELECT * FROM admin_sessions
            WHERE token_hash = $1 AND is_active = true AND expires_at > NOW()
        ";

        sqlx::query_as::<_, AdminSessionDb>(query)
            .bind(token_hash)
            .fetch_one(pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    Error::Authentication("Invalid or expired session".to_string())
                }
                _ => Error::Database(e.to_string()),
            })
    }

    /// Record activity on a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn touch(pool: &PgPool, session_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE admin_sessions SET last_seen_at = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Revoke a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke(pool: &PgPool, session_id: Uuid, reason: &str) -> Result<bool> {
        let query = r"
            UPDATE admin_sessions
            SET is_active = false, terminated_at = NOW(), termination_reason = $2
            WHERE id = $1 AND is_active = true
        ";

        let result = sqlx::query(query)
            .bind(session_id)
            .bind(reason)
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(EntityKind::Lead, Some("status"))]
    #[case(EntityKind::PortfolioItem, Some("status"))]
    #[case(EntityKind::User, Some("role"))]
    #[case(EntityKind::Page, None)]
    #[case(EntityKind::SeoSetting, None)]
    fn test_filter_clause_uses_status_field(
        #[case] kind: EntityKind,
        #[case] field: Option<&str>,
    ) {
        let clause = filter_clause(kind);
        match field {
            Some(field) => assert!(clause.contains(&format!("fields->>'{field}' = $1"))),
            None => assert!(clause.starts_with("WHERE $1::text IS NULL AND")),
        }
        assert!(clause.contains("ILIKE"));
    }

    #[rstest]
    #[case(EntityKind::Lead)]
    #[case(EntityKind::SeoSetting)]
    fn test_search_matches_values_not_names(#[case] kind: EntityKind) {
        let clause = filter_clause(kind);
        assert!(clause.contains("jsonb_each_text(fields)"));
        assert!(clause.contains("field.value ILIKE '%' || $2 || '%'"));
        assert!(!clause.contains("fields::text"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = write_error(EntityKind::Page, sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound { ref resource } if resource == "pages"));
    }

    #[test]
    fn test_other_errors_map_to_database() {
        let err = write_error(EntityKind::Lead, sqlx::Error::PoolTimedOut);
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_default_filter_is_unbounded() {
        let filter = EntityFilter::default();
        assert_eq!(filter.status, None);
        assert_eq!(filter.search, None);
    }

    #[tokio::test]
    async fn test_queries_fail_without_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(1))
            .connect_lazy("postgresql://127.0.0.1:1/limitless")
            .unwrap();

        let result = EntityQueries::find_by_id(&pool, EntityKind::Lead, Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let result = SessionQueries::find_active(&pool, "0".repeat(32).as_str()).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
