//! Management screen for one collection
//!
//! The page owns a [`ManagementScreen`] for the collection named in the route.
//! Every state transition is mirrored into a signal, so the table and forms
//! re-render from the latest [`ScreenView`]. Leaving the page unmounts the
//! screen, which discards responses that arrive afterwards.

use crate::{
    api_client::ApiClient,
    components::{
        entity_form::EntityForm,
        entity_table::{EntityTable, visible_rows},
        loading::Loading,
    },
    forms::{Draft, changed_fields, create_fields, draft_from_entity},
    pages::{login::SignInRequired, not_found::NotFound},
    state::use_ui_state,
};
use leptos::{prelude::*, reactive::owner::LocalStorage, task::spawn_local};
use leptos_router::hooks::use_params_map;
use limitless_core::{
    EntityKind, ManagedEntity, ManagementScreen, Result, ScreenView,
    screen::{ListStatus, Outcome},
};
use std::{future::Future, rc::Rc};
use uuid::Uuid;

type Screen = Rc<ManagementScreen<ApiClient>>;
type ScreenHandle = StoredValue<Screen, LocalStorage>;

/// Route component for `/admin/:collection`
#[component]
pub fn ManagementPage() -> impl IntoView {
    let current = use_ui_state().current;
    let params = use_params_map();
    let kind = Memo::new(move |_| {
        params.with(|params| {
            params
                .get("collection")
                .and_then(|segment| EntityKind::from_route_segment(&segment))
        })
    });

    view! {
        <Show when=move || current.with(Option::is_some) fallback=SignInRequired>
            {move || match kind.get() {
                Some(kind) => view! { <CollectionScreen kind=kind /> }.into_any(),
                None => view! { <NotFound /> }.into_any(),
            }}
        </Show>
    }
}

/// Run one screen operation in the background and hand its result to `done`
fn run<F, Fut>(handle: ScreenHandle, action: F, done: impl FnOnce(Result<Outcome>) + 'static)
where
    F: FnOnce(Screen) -> Fut + 'static,
    Fut: Future<Output = Result<Outcome>> + 'static,
{
    let Some(screen) = handle.try_get_value() else {
        return;
    };
    spawn_local(async move {
        done(action(screen).await);
    });
}

fn load(handle: ScreenHandle) {
    run(
        handle,
        |screen| async move { screen.load().await },
        |result| {
            if let Err(err) = result {
                tracing::warn!(error = %err, "Collection load not started");
            }
        },
    );
}

fn find_entity(view: &ScreenView, id: Uuid) -> Option<ManagedEntity> {
    view.rows
        .iter()
        .find(|row| row.entity.id == id)
        .map(|row| row.entity.clone())
}

#[component]
fn CollectionScreen(kind: EntityKind) -> impl IntoView {
    let api = use_ui_state().api;

    let view_state = RwSignal::new(ScreenView::default());
    let search = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<Uuid>);
    let form_error = RwSignal::new(None::<String>);
    let edit_error = RwSignal::new(None::<String>);
    let form_epoch = RwSignal::new(0_u32);

    let screen: Screen = Rc::new(ManagementScreen::new(kind, api));
    screen.on_change(move |view| {
        view_state.try_set(view.clone());
    });
    screen.mount();
    let handle: ScreenHandle = StoredValue::new_local(screen);

    on_cleanup(move || {
        if let Some(screen) = handle.try_get_value() {
            screen.unmount();
        }
    });

    load(handle);

    let on_create = Callback::new(move |draft: Draft| match create_fields(kind.schema(), &draft) {
        Err(err) => form_error.set(Some(err.user_message())),
        Ok(fields) => {
            form_error.set(None);
            run(
                handle,
                move |screen| async move { screen.create(fields).await },
                move |result| match result {
                    Ok(Outcome::Applied) => form_epoch.update(|epoch| *epoch += 1),
                    Ok(_) => {}
                    Err(err) => form_error.set(Some(err.user_message())),
                },
            );
        }
    });

    let on_dismiss_create = Callback::new(move |()| {
        form_error.set(None);
        if let Some(screen) = handle.try_get_value() {
            screen.dismiss_create_error();
        }
    });

    let on_save = Callback::new(move |draft: Draft| {
        let Some(id) = editing.get_untracked() else {
            return;
        };
        let Some(entity) = view_state.with_untracked(|view| find_entity(view, id)) else {
            editing.set(None);
            return;
        };

        match changed_fields(&entity, &draft) {
            Err(err) => edit_error.set(Some(err.user_message())),
            Ok(changes) if changes.is_empty() => editing.set(None),
            Ok(changes) => {
                edit_error.set(None);
                editing.set(None);
                run(
                    handle,
                    move |screen| async move { screen.update(id, changes).await },
                    move |result| {
                        if let Err(err) = result {
                            edit_error.set(Some(err.user_message()));
                            editing.set(Some(id));
                        }
                    },
                );
            }
        }
    });

    let on_edit = Callback::new(move |id: Uuid| {
        edit_error.set(None);
        editing.set(Some(id));
    });

    let on_delete = Callback::new(move |id: Uuid| {
        if editing.get_untracked() == Some(id) {
            editing.set(None);
        }
        run(
            handle,
            move |screen| async move { screen.delete(id).await },
            move |result| {
                if let Err(err) = result {
                    tracing::warn!(%id, error = %err, "Delete not started");
                }
            },
        );
    });

    let on_dismiss_row = Callback::new(move |id: Uuid| {
        if let Some(screen) = handle.try_get_value() {
            screen.dismiss_error(id);
        }
    });

    let rows = Signal::derive(move || {
        let rows = view_state.with(|view| view.rows.clone());
        search.with(|term| visible_rows(rows, term))
    });
    let creating = Signal::derive(move || view_state.with(|view| view.creating));
    let create_error = Signal::derive(move || {
        form_error
            .get()
            .or_else(|| view_state.with(|view| view.create_error.clone()))
    });

    let status = move || match view_state.with(|view| view.status.clone()) {
        ListStatus::Loading => view! { <Loading message="Loading records..." /> }.into_any(),
        ListStatus::Failed(message) => view! {
            <div class="list-error" role="alert">
                <p>{message}</p>
                <button type="button" class="btn" on:click=move |_| load(handle)>
                    "Retry"
                </button>
            </div>
        }
        .into_any(),
        ListStatus::Idle | ListStatus::Ready => view! { <div class="list-status"></div> }.into_any(),
    };

    let edit_target = Memo::new(move |_| editing.get());
    let edit_panel = move || {
        let id = edit_target.get()?;
        let entity = view_state.with_untracked(|view| find_entity(view, id))?;
        Some(view! {
            <section class="edit-panel">
                <h3>"Edit " {entity.title()}</h3>
                <EntityForm
                    schema=kind.schema()
                    initial=draft_from_entity(&entity)
                    submit_label="Save"
                    busy=Signal::derive(|| false)
                    error=edit_error
                    on_dismiss=Callback::new(move |()| edit_error.set(None))
                    on_submit=on_save
                    on_cancel=Callback::new(move |()| editing.set(None))
                />
            </section>
        })
    };

    let create_form = move || {
        form_epoch.track();
        view! {
            <EntityForm
                schema=kind.schema()
                submit_label="Create"
                busy=creating
                error=create_error
                on_dismiss=on_dismiss_create
                on_submit=on_create
            />
        }
    };

    view! {
        <section class="management">
            <div class="management-header">
                <h2>{kind.label()}</h2>
                <input
                    class="search"
                    type="search"
                    placeholder="Search..."
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
                <span class="record-count">
                    {move || rows.with(Vec::len)} " shown"
                </span>
            </div>
            {status}
            <EntityTable
                kind=kind
                rows=rows
                on_edit=on_edit
                on_delete=on_delete
                on_dismiss=on_dismiss_row
            />
            {edit_panel}
            <section class="create-panel">
                <h3>"Add to " {kind.label()}</h3>
                {create_form}
            </section>
        </section>
    }
}
