//! Table of a collection's cached records

use crate::components::inline_error::InlineError;
use leptos::prelude::*;
use limitless_core::{
    EntityKind, FieldSpec, FieldType, FieldValue,
    screen::{Action, RowView},
};
use uuid::Uuid;

/// Columns shown before the status column
const LEADING_COLUMNS: usize = 3;

/// Schema fields shown as table columns
///
/// The first few short fields, plus the kind's status field when it is not
/// already among them.
#[must_use]
pub fn table_columns(kind: EntityKind) -> Vec<&'static FieldSpec> {
    let mut columns: Vec<&'static FieldSpec> = kind
        .schema()
        .iter()
        .filter(|spec| spec.field_type != FieldType::LongText)
        .take(LEADING_COLUMNS)
        .collect();

    if let Some(status) = kind.status_field().and_then(|name| kind.field(name)) {
        if !columns.iter().any(|spec| spec.name == status.name) {
            columns.push(status);
        }
    }
    columns
}

/// Rows whose text matches `term`; a blank term keeps every row
#[must_use]
pub fn visible_rows(rows: Vec<RowView>, term: &str) -> Vec<RowView> {
    rows.into_iter()
        .filter(|row| row.entity.matches_search(term))
        .collect()
}

/// Busy marker text for an in-flight mutation
#[must_use]
pub const fn pending_label(action: Action) -> &'static str {
    match action {
        Action::Create => "Creating...",
        Action::Update => "Saving...",
        Action::Delete => "Deleting...",
    }
}

/// Cached records with per-row busy markers and inline errors
#[component]
pub fn EntityTable(
    /// Kind whose schema picks the columns
    kind: EntityKind,
    /// Rows to render, already filtered
    #[prop(into)]
    rows: Signal<Vec<RowView>>,
    /// Open the editor for a record
    on_edit: Callback<Uuid>,
    /// Delete a record
    on_delete: Callback<Uuid>,
    /// Clear a record's inline error
    on_dismiss: Callback<Uuid>,
) -> impl IntoView {
    let columns = table_columns(kind);
    let headers = columns
        .iter()
        .map(|spec| view! { <th>{spec.label}</th> })
        .collect_view();

    view! {
        <table class="entity-table">
            <thead>
                <tr>
                    {headers}
                    <th class="actions">"Actions"</th>
                </tr>
            </thead>
            <tbody>
                {move || {
                    let columns = columns.clone();
                    rows.get()
                        .into_iter()
                        .map(|row| {
                            view! {
                                <EntityRow
                                    row=row
                                    columns=columns.clone()
                                    on_edit=on_edit
                                    on_delete=on_delete
                                    on_dismiss=on_dismiss
                                />
                            }
                        })
                        .collect_view()
                }}
            </tbody>
        </table>
    }
}

#[component]
fn EntityRow(
    row: RowView,
    columns: Vec<&'static FieldSpec>,
    on_edit: Callback<Uuid>,
    on_delete: Callback<Uuid>,
    on_dismiss: Callback<Uuid>,
) -> impl IntoView {
    let id = row.entity.id;
    let busy = row.is_busy();
    let span = columns.len() + 1;

    let cells = columns
        .iter()
        .map(|spec| {
            let text = row
                .entity
                .field(spec.name)
                .map(FieldValue::display)
                .unwrap_or_default();
            view! { <td>{text}</td> }
        })
        .collect_view();

    let marker = row.pending.map(|action| {
        view! { <span class="busy-marker">{pending_label(action)}</span> }
    });

    let error = row.error.map(|message| {
        view! {
            <tr class="row-error">
                <td colspan=span>
                    <InlineError message=message on_dismiss=Callback::new(move |()| on_dismiss.run(id)) />
                </td>
            </tr>
        }
    });

    view! {
        <tr class="entity-row" class:busy=busy>
            {cells}
            <td class="actions">
                {marker}
                <button
                    type="button"
                    class="btn btn-sm"
                    disabled=busy
                    on:click=move |_| on_edit.run(id)
                >
                    "Edit"
                </button>
                <button
                    type="button"
                    class="btn btn-sm btn-danger"
                    disabled=busy
                    on:click=move |_| on_delete.run(id)
                >
                    "Delete"
                </button>
            </td>
        </tr>
        {error}
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use chrono::Utc;
    use limitless_core::{ManagedEntity, fields};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(kind: EntityKind) -> Vec<&'static str> {
        table_columns(kind).iter().map(|spec| spec.name).collect()
    }

    fn row(name: &str, company: &str) -> RowView {
        RowView {
            entity: ManagedEntity {
                id: Uuid::new_v4(),
                kind: EntityKind::Lead,
                fields: fields! { "name" => name, "company" => company },
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            pending: None,
            error: None,
        }
    }

    #[rstest]
    #[case(EntityKind::Lead, vec!["name", "email", "subject", "status"])]
    #[case(EntityKind::Page, vec!["page_name", "slug", "is_published"])]
    #[case(EntityKind::User, vec!["email", "full_name", "role"])]
    #[case(EntityKind::PortfolioItem, vec!["title", "category", "client", "status"])]
    fn test_table_columns(#[case] kind: EntityKind, #[case] expected: Vec<&str>) {
        assert_eq!(names(kind), expected);
    }

    #[test]
    fn test_visible_rows_filters_case_insensitively() {
        let rows = vec![row("Ada", "Analytical Engines"), row("Grace", "Navy")];

        let visible = visible_rows(rows.clone(), "ENGINES");
        assert_eq!(visible.len(), 1);
        assert_eq!(
            visible.first().and_then(|row| row.entity.text("name")),
            Some("Ada")
        );

        assert_eq!(visible_rows(rows, "  ").len(), 2);
    }

    #[test]
    fn test_pending_labels() {
        assert_eq!(pending_label(Action::Delete), "Deleting...");
        assert_eq!(pending_label(Action::Update), "Saving...");
    }
}
