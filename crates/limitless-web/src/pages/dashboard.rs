//! Admin landing page linking to each managed collection

use crate::{pages::login::SignInRequired, state::use_ui_state};
use leptos::prelude::*;
use leptos_router::components::A;
use limitless_core::EntityKind;

/// One-line summary of what a collection holds
#[must_use]
pub const fn collection_blurb(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Lead => "Contact-form submissions and their follow-up status",
        EntityKind::Page => "Site pages and their published state",
        EntityKind::PortfolioItem => "Case studies shown in the portfolio",
        EntityKind::User => "Back-office accounts and roles",
        EntityKind::SeoSetting => "Titles, descriptions and indexing per page",
    }
}

/// Main dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let current = use_ui_state().current;
    let greeting = move || {
        current.with(|info| {
            info.as_ref()
                .map(|info| format!("Signed in as {} ({})", info.email, info.role))
        })
    };

    view! {
        <Show when=move || current.with(Option::is_some) fallback=SignInRequired>
            <div class="dashboard">
                <h2>"Dashboard"</h2>
                <p class="greeting">{greeting}</p>
                <div class="dashboard-grid">
                    {EntityKind::ALL
                        .into_iter()
                        .map(|kind| {
                            view! {
                                <div class="dashboard-card">
                                    <h3>
                                        <A href=format!("/admin/{}", kind.route_segment())>
                                            {kind.label()}
                                        </A>
                                    </h3>
                                    <p>{collection_blurb(kind)}</p>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
        </Show>
    }
}
