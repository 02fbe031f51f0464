//! Schema-driven form for creating or editing a record

use crate::{components::inline_error::InlineError, forms::Draft};
use leptos::{ev::SubmitEvent, prelude::*};
use limitless_core::{FieldSpec, FieldType};

/// HTML input type for a single-line field
#[must_use]
pub const fn input_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Email => "email",
        FieldType::Url => "url",
        FieldType::Integer => "number",
        _ => "text",
    }
}

/// Inputs for every field of `schema`, submitted as a [`Draft`]
#[component]
pub fn EntityForm(
    /// Fields to render, in order
    schema: &'static [FieldSpec],
    /// Initial input text
    #[prop(optional)]
    initial: Draft,
    /// Label of the submit button
    submit_label: &'static str,
    /// Disable submission while a request is in flight
    #[prop(into)]
    busy: Signal<bool>,
    /// Error shown above the inputs
    #[prop(into)]
    error: Signal<Option<String>>,
    /// Clear the error
    on_dismiss: Callback<()>,
    /// Receives the inputs on submit
    on_submit: Callback<Draft>,
    /// Shows a cancel button when present
    #[prop(optional)]
    on_cancel: Option<Callback<()>>,
) -> impl IntoView {
    let draft = RwSignal::new(initial);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        on_submit.run(draft.get());
    };

    let inputs = schema
        .iter()
        .map(|spec| view! { <FieldInput spec=spec draft=draft /> })
        .collect_view();

    let cancel = on_cancel.map(|on_cancel| {
        view! {
            <button type="button" class="btn" on:click=move |_| on_cancel.run(())>
                "Cancel"
            </button>
        }
    });

    view! {
        <form class="entity-form" on:submit=submit>
            {move || {
                error
                    .get()
                    .map(|message| view! { <InlineError message=message on_dismiss=on_dismiss /> })
            }}
            {inputs}
            <div class="form-actions">
                <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                    {submit_label}
                </button>
                {cancel}
            </div>
        </form>
    }
}

#[component]
fn FieldInput(spec: &'static FieldSpec, draft: RwSignal<Draft>) -> impl IntoView {
    let name = spec.name;
    let value = move || draft.with(|d| d.get(name).cloned().unwrap_or_default());
    let set = move |text: String| {
        draft.update(|d| {
            d.insert(name.to_string(), text);
        });
    };

    let control = match spec.field_type {
        FieldType::LongText => view! {
            <textarea
                id=name
                name=name
                rows="5"
                prop:value=value
                on:input=move |ev| set(event_target_value(&ev))
            ></textarea>
        }
        .into_any(),
        FieldType::Choice(options) => view! {
            <select id=name name=name prop:value=value on:change=move |ev| set(event_target_value(&ev))>
                <option value="">"-"</option>
                {options
                    .iter()
                    .map(|option| view! { <option value=*option>{*option}</option> })
                    .collect_view()}
            </select>
        }
        .into_any(),
        FieldType::Boolean => view! {
            <select id=name name=name prop:value=value on:change=move |ev| set(event_target_value(&ev))>
                <option value="">"-"</option>
                <option value="yes">"Yes"</option>
                <option value="no">"No"</option>
            </select>
        }
        .into_any(),
        FieldType::Tags => view! {
            <input
                id=name
                name=name
                type="text"
                placeholder="Comma separated"
                prop:value=value
                on:input=move |ev| set(event_target_value(&ev))
            />
        }
        .into_any(),
        other => view! {
            <input
                id=name
                name=name
                type=input_type(other)
                prop:value=value
                on:input=move |ev| set(event_target_value(&ev))
            />
        }
        .into_any(),
    };

    view! {
        <div class="form-field" class:required=spec.required>
            <label for=name>{spec.label} {spec.required.then_some(" *")}</label>
            {control}
        </div>
    }
}
