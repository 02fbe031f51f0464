//! CORS policy built from `api.cors_origins`

use axum::http::{HeaderValue, Method, header, request::Parts};
use limitless_core::config::ApiConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Build the CORS layer; `*` allows any origin and `*.example.com` any subdomain
#[must_use]
pub fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed = config.cors_origins.clone();
    layer.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .is_ok_and(|origin| is_origin_allowed(origin, &allowed))
        },
    ))
}

/// Check if the given origin is allowed by the configured list
fn is_origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|allowed| {
        allowed == origin
            || allowed
                .strip_prefix("*.")
                .is_some_and(|domain| origin.ends_with(&format!(".{domain}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://limitless.example", true)]
    #[case("https://admin.limitless.example", true)]
    #[case("https://evil-limitless.example", false)]
    #[case("https://other.example", false)]
    fn test_origin_matching(#[case] origin: &str, #[case] allowed: bool) {
        let configured = vec![
            "https://limitless.example".to_string(),
            "*.limitless.example".to_string(),
        ];
        assert_eq!(is_origin_allowed(origin, &configured), allowed);
    }
}
