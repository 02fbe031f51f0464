//! Limitless admin interface
//!
//! A client-rendered Leptos app: breadcrumb trail, a management screen per
//! entity kind backed by the admin API, and token sign-in.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod app;
pub mod components;
pub mod forms;
pub mod pages;
pub mod state;

pub use api_client::ApiClient;
pub use app::App;
pub use state::UiState;
