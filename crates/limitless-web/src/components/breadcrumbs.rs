//! Breadcrumb trail for the current location

use leptos::prelude::*;
use leptos_router::{components::A, hooks::use_location};
use limitless_core::derive_breadcrumbs;

/// Trail derived from the router's current path; renders nothing at the root
#[component]
pub fn Breadcrumbs() -> impl IntoView {
    let location = use_location();
    let trail = Memo::new(move |_| location.pathname.with(|path| derive_breadcrumbs(path)));

    view! {
        <Show when=move || trail.with(|items| !items.is_empty())>
            <nav class="breadcrumbs" aria-label="Breadcrumb">
                <ol>
                    {move || {
                        trail
                            .get()
                            .into_iter()
                            .map(|item| {
                                if item.is_active {
                                    view! {
                                        <li class="breadcrumb active" aria-current="page">
                                            {item.label}
                                        </li>
                                    }
                                        .into_any()
                                } else {
                                    view! {
                                        <li class="breadcrumb">
                                            <A href=item.href>{item.label}</A>
                                        </li>
                                    }
                                        .into_any()
                                }
                            })
                            .collect_view()
                    }}
                </ol>
            </nav>
        </Show>
    }
}
