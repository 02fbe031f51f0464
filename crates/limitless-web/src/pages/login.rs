//! Sign-in with a session token issued by the auth provider

use crate::{components::inline_error::InlineError, state::use_ui_state};
use leptos::{ev::SubmitEvent, prelude::*, task::spawn_local};
use leptos_router::{NavigateOptions, components::A, hooks::use_navigate};
use limitless_core::Error;

/// Message shown when a sign-in attempt fails
#[must_use]
pub fn login_error_message(err: &Error) -> String {
    match err {
        Error::Authentication(_) => "That session token is not valid or has expired.".to_string(),
        Error::Forbidden(_) => "This account does not have admin access.".to_string(),
        other => other.user_message(),
    }
}

/// Sign-in page
#[component]
pub fn Login() -> impl IntoView {
    let current = use_ui_state().current;

    view! {
        <div class="login">
            <h2>"Sign in"</h2>
            <Show
                when=move || current.with(Option::is_none)
                fallback=|| {
                    view! {
                        <p>
                            "You are signed in. " <A href="/admin">"Go to the dashboard"</A>
                        </p>
                    }
                }
            >
                <LoginForm />
            </Show>
        </div>
    }
}

/// Token form; a verified admin session is installed and the dashboard opened
#[component]
fn LoginForm() -> impl IntoView {
    let state = use_ui_state();
    let navigate = use_navigate();

    let token = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let pending = RwSignal::new(false);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let value = token.get().trim().to_string();
        if value.is_empty() {
            error.set(Some("Enter your session token.".to_string()));
            return;
        }

        let state = state.clone();
        let navigate = navigate.clone();
        pending.set(true);
        spawn_local(async move {
            match state.api.fetch_session(&value).await {
                Ok(info) if info.role.is_admin() => {
                    state.sign_in(info, value);
                    error.set(None);
                    navigate("/admin", NavigateOptions::default());
                }
                Ok(info) => {
                    tracing::warn!(role = %info.role, "Non-admin sign-in refused");
                    error.set(Some(login_error_message(&Error::Forbidden(info.email))));
                }
                Err(err) => error.set(Some(login_error_message(&err))),
            }
            pending.set(false);
        });
    };

    view! {
        <form class="login-form" on:submit=submit>
            {move || {
                error
                    .get()
                    .map(|message| {
                        view! {
                            <InlineError
                                message=message
                                on_dismiss=Callback::new(move |()| error.set(None))
                            />
                        }
                    })
            }}
            <label for="token">"Session token"</label>
            <input
                id="token"
                type="password"
                autocomplete="off"
                prop:value=move || token.get()
                on:input=move |ev| token.set(event_target_value(&ev))
            />
            <button type="submit" class="btn btn-primary" disabled=move || pending.get()>
                "Sign in"
            </button>
        </form>
    }
}

/// Shown in place of admin pages when no admin session is installed
#[component]
pub fn SignInRequired() -> impl IntoView {
    view! {
        <div class="sign-in-required">
            <p>"Sign in with an admin session to continue."</p>
            <A href="/login" attr:class="btn btn-primary">"Sign in"</A>
        </div>
    }
}
