//! Dismissable inline error

use leptos::prelude::*;

/// Error message shown next to the row or form it belongs to
#[component]
pub fn InlineError(
    /// Message, shown verbatim
    message: String,
    /// Called when the user dismisses the message
    on_dismiss: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="inline-error" role="alert">
            <span class="inline-error-message">{message}</span>
            <button type="button" class="btn btn-sm" on:click=move |_| on_dismiss.run(())>
                "Dismiss"
            </button>
        </div>
    }
}
