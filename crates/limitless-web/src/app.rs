//! Main Leptos application component with routing

use crate::{
    components::breadcrumbs::Breadcrumbs,
    pages::{
        dashboard::Dashboard, login::Login, management::ManagementPage, not_found::NotFound,
    },
    state::{UiState, api_base_url, use_ui_state},
};
use leptos::{prelude::*, task::spawn_local};
use leptos_router::{
    components::{A, Route, Router, Routes},
    NavigateOptions,
    hooks::use_navigate,
    path,
};
use limitless_core::EntityKind;

/// Main application component
#[component]
pub fn App() -> impl IntoView {
    provide_context(UiState::new(api_base_url()));

    view! {
        <Router>
            <main class="app">
                <Header />
                <div class="content">
                    <Breadcrumbs />
                    <Routes fallback=|| view! { <NotFound /> }>
                        <Route path=path!("/") view=Login />
                        <Route path=path!("/login") view=Login />
                        <Route path=path!("/admin") view=Dashboard />
                        <Route path=path!("/admin/:collection") view=ManagementPage />
                    </Routes>
                </div>
            </main>
        </Router>
    }
}

/// Application header with navigation over the managed collections
#[component]
fn Header() -> impl IntoView {
    let current = use_ui_state().current;
    let signed_in = move || current.with(Option::is_some);

    view! {
        <header class="header">
            <div class="header-content">
                <h1 class="logo">
                    <A href="/admin">Limitless Admin</A>
                </h1>
                <Show when=signed_in>
                    <nav class="nav">
                        {EntityKind::ALL
                            .into_iter()
                            .map(|kind| {
                                let href = format!("/admin/{}", kind.route_segment());
                                view! { <A href=href attr:class="nav-link">{kind.label()}</A> }
                            })
                            .collect_view()}
                    </nav>
                    <SignOut />
                </Show>
            </div>
        </header>
    }
}

/// Revokes the session on the server, then forgets it locally
#[component]
fn SignOut() -> impl IntoView {
    let state = use_ui_state();
    let navigate = use_navigate();

    let on_click = move |_| {
        let state = state.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            if let Err(err) = state.api.logout().await {
                tracing::warn!(error = %err, "Server-side logout failed");
            }
            state.sign_out();
            navigate("/login", NavigateOptions::default());
        });
    };

    view! {
        <button class="btn btn-sm sign-out" on:click=on_click>
            "Sign out"
        </button>
    }
}
