//! Browser entry point for the admin interface
#![forbid(unsafe_code)]

use limitless_web::App;

fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
