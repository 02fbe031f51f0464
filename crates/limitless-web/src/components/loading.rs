//! Loading indicator

use leptos::prelude::*;

/// Spinner with a short message
#[component]
pub fn Loading(
    /// Text under the spinner
    #[prop(default = "Loading...")]
    message: &'static str,
) -> impl IntoView {
    view! {
        <div class="loading" aria-busy="true">
            <div class="spinner"></div>
            <p>{message}</p>
        </div>
    }
}
