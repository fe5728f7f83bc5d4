// consent-backend/tests/consent_endpoint.rs
//
// Endpoint-level tests that drive the router directly. None of these
// branches reach the database, so the state is built without a pool; the
// unconfigured-backend case doubles as the generic-500 check.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use consent_backend::api::handlers::consent_handler::consent_router;
use consent_backend::api::AppState;
use consent_backend::utils::allowlist::DomainAllowlist;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_router() -> Router {
    let allowlist = DomainAllowlist::new(["www.state-of-mind.co", "philia-store.com"]);
    consent_router(AppState::new(None, allowlist))
}

async fn response_error(body: Body) -> String {
    let bytes = to_bytes(body, 64 * 1024).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    value["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn preflight_echoes_exact_origin() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .header(header::ORIGIN, "https://www.state-of-mind.co")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://www.state-of-mind.co"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
        "POST, OPTIONS"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
        "Content-Type"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
}

#[tokio::test]
async fn preflight_from_unknown_origin_is_rejected_without_cors() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn post_without_resolvable_origin_is_rejected_without_cors() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::HOST, "api.internal")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn malformed_origin_header_is_a_hard_failure() {
    // Referer が許可ドメインでも、壊れた Origin は即拒否
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "not a url")
                .header(header::REFERER, "https://philia-store.com/page")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unsupported_method_gets_405() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/")
                .header(header::ORIGIN, "https://philia-store.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    // オリジンが解決できた場合は 405 にも CORS ヘッダーを付ける
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://philia-store.com"
    );
}

#[tokio::test]
async fn oversized_content_length_is_rejected_before_parsing() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "https://philia-store.com")
                .header(header::CONTENT_LENGTH, "70000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_error(response.into_body()).await,
        "Request body too large"
    );
}

#[tokio::test]
async fn unparsable_json_body_gets_400() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "https://philia-store.com")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_consent_object_gets_400_with_cors() {
    let body = json!({ "action": "accept_all", "consent": "yes" });
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "https://philia-store.com")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://philia-store.com"
    );
}

#[tokio::test]
async fn unauthorized_domain_claim_gets_403_with_cors() {
    // 呼び出し元は許可されているので CORS ヘッダーは付くが、本文は 403
    let body = json!({ "consent": {}, "domain": "evil.example" });
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "https://philia-store.com")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://philia-store.com"
    );
}

#[tokio::test]
async fn missing_backend_config_answers_generic_500() {
    let body = json!({ "action": "accept_all", "consent": { "essential": true } });
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "https://philia-store.com")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // どの環境変数が欠けているかは応答に含めない
    assert_eq!(
        response_error(response.into_body()).await,
        "Server configuration error"
    );
}
