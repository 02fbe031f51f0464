//! End-to-end tests of the router and its middleware stack

#![allow(clippy::missing_panics_doc, clippy::field_reassign_with_default)]

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::{get, json_body, test_app, test_config};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = test_app(test_config());

    let response = app.send(get("/api/nope")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn test_inbound_webhook_acknowledges_json() {
    let app = test_app(test_config());

    let response = app
        .send_json(Method::POST, "/api/email/inbound", r#"{"from":"a@example.com"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn test_inbound_webhook_rejects_malformed_json() {
    let app = test_app(test_config());

    let response = app
        .send_json(Method::POST, "/api/email/inbound", "not json")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_lead_missing_fields_rejected_before_store() {
    let app = test_app(test_config());

    let response = app
        .send_json(Method::POST, "/api/leads", r#"{"name":"Ada","email":"ada@example.com"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_analytics_requires_event_type() {
    let app = test_app(test_config());

    let response = app
        .send_json(Method::POST, "/api/analytics", r#"{"eventType":"","pageUrl":"/"}"#)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_endpoints_are_rate_limited_per_client() {
    let mut config = test_config();
    config.api.rate_limit = 2;
    let app = test_app(config);

    let inbound = |ip: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/email/inbound")
            .header("x-forwarded-for", ip)
            .body(Body::from("{}"))
            .unwrap()
    };

    assert_eq!(app.send(inbound("198.51.100.1")).await.status(), StatusCode::OK);
    assert_eq!(app.send(inbound("198.51.100.1")).await.status(), StatusCode::OK);

    let limited = app.send(inbound("198.51.100.1")).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(json_body(limited).await["code"], "RATE_LIMITED");

    assert_eq!(app.send(inbound("198.51.100.2")).await.status(), StatusCode::OK);
}

#[rstest]
#[case(None)]
#[case(Some("Basic YWRtaW46YWRtaW4="))]
#[case(Some("Bearer "))]
#[tokio::test]
async fn test_admin_routes_require_bearer_token(#[case] auth: Option<&str>) {
    let app = test_app(test_config());

    let mut request = Request::builder().uri("/api/admin/collections/leads");
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    let response = app.send(request.body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_session_endpoint_without_session_is_unauthorized() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app.send(get("/api/admin/session")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app.send(get("/api/admin/collections/invoices")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "UNKNOWN_COLLECTION");
}

#[tokio::test]
async fn test_status_filter_on_pages_is_rejected() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app
        .send(get("/api/admin/collections/pages?status=published"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_missing_required_field_is_rejected() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app
        .send_json(
            Method::POST,
            "/api/admin/collections/pages",
            r#"{"slug":"about"}"#,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "page_name: is required");
    assert_eq!(body["details"]["field"], "page_name");
}

#[tokio::test]
async fn test_create_with_reserved_field_is_rejected() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app
        .send_json(
            Method::POST,
            "/api/admin/collections/seo",
            r#"{"id":"x","page_url":"/","title":"Home"}"#,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["field"], "id");
}

#[rstest]
#[case("leads", r#"{"name":"Ada","email":"not-an-email","subject":"Hi","message":"Hello"}"#, "email")]
#[case("seo", r#"{"page_url":"::::garbage","title":"Home"}"#, "page_url")]
#[tokio::test]
async fn test_create_with_malformed_address_is_rejected(
    #[case] collection: &str,
    #[case] body: &str,
    #[case] field: &str,
) {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app
        .send_json(
            Method::POST,
            &format!("/api/admin/collections/{collection}"),
            body,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["field"], field);
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app
        .send_json(
            Method::PUT,
            "/api/admin/collections/users/6f1c2a55-4a8e-4d7b-9a39-3a1e2f3b4c5d",
            "{}",
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No fields to update");
}

#[tokio::test]
async fn test_send_email_uses_default_sender() {
    let mut config = test_config();
    config.security.require_session = false;
    config.mailer.default_from = "Limitless <hello@limitless.example>".to_string();
    let app = test_app(config);

    let response = app
        .send_json(
            Method::POST,
            "/api/admin/email/send",
            r#"{"to":"ada@example.com","subject":"Welcome","html":"<p>Hi</p>"}"#,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Email sent successfully");
    assert!(body["id"].as_str().unwrap().starts_with("mock-"));

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "Limitless <hello@limitless.example>");
    assert_eq!(sent[0].to, vec!["ada@example.com"]);
}

#[tokio::test]
async fn test_send_email_rejects_invalid_recipient() {
    let mut config = test_config();
    config.security.require_session = false;
    let app = test_app(config);

    let response = app
        .send_json(
            Method::POST,
            "/api/admin/email/send",
            r#"{"to":"not-an-address","subject":"Hi","html":"<p>Hi</p>"}"#,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = test_app(test_config());

    let response = app.send(get("/ready")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app(test_config());

    let request = Request::builder()
        .uri("/api/nope")
        .header("x-request-id", "req_test")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.headers()["x-request-id"], "req_test");
}

#[tokio::test]
async fn test_request_id_is_generated_when_absent() {
    let app = test_app(test_config());

    let response = app.send(get("/api/nope")).await;

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(id.starts_with("req_"));
}

#[tokio::test]
async fn test_cors_preflight_for_allowed_origin() {
    let mut config = test_config();
    config.api.enable_cors = true;
    config.api.cors_origins = vec!["https://limitless.example".to_string()];
    let app = test_app(config);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/leads")
        .header(header::ORIGIN, "https://limitless.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://limitless.example"
    );
}
