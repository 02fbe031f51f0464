//! Application state shared through Leptos context

use crate::api_client::ApiClient;
use leptos::prelude::*;
use limitless_core::{Session, SessionContext, types::SessionInfo};

/// API root used when the build does not set `LIMITLESS_API_URL`
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// API root baked in at build time
#[must_use]
pub fn api_base_url() -> &'static str {
    option_env!("LIMITLESS_API_URL").unwrap_or(DEFAULT_API_URL)
}

/// State provided to every component by [`crate::app::App`]
#[derive(Debug, Clone)]
pub struct UiState {
    /// API client for backend communication
    pub api: ApiClient,
    /// Current session; the API client reads its token from here
    pub session: SessionContext,
    /// Reactive mirror of the session, for views that show or hide on sign-in
    pub current: RwSignal<Option<SessionInfo>>,
}

impl UiState {
    /// Signed-out state talking to the API at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let session = SessionContext::new();
        Self {
            api: ApiClient::new(base_url, session.clone()),
            session,
            current: RwSignal::new(None),
        }
    }

    /// Install a verified session
    pub fn sign_in(&self, info: SessionInfo, token: String) {
        self.session.sign_in(Session {
            user_id: info.user_id,
            email: info.email.clone(),
            role: info.role,
            token,
            expires_at: info.expires_at,
        });
        self.current.set(Some(info));
    }

    /// Drop the session locally
    pub fn sign_out(&self) {
        self.session.sign_out();
        self.current.set(None);
    }

    /// Whether an unexpired admin session is installed
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }
}

/// Fetch the [`UiState`] provided by the app shell
///
/// # Panics
///
/// Panics when called outside [`crate::app::App`].
#[must_use]
pub fn use_ui_state() -> UiState {
    expect_context::<UiState>()
}
