// src/api/handlers/consent_handler.rs
use crate::api::AppState;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::utils::origin::{resolve_allowed_origin, RequestContext};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Best-effort request size ceiling. A body-size-enforcing proxy in front of
/// the service is still expected.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn consent_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(submit_consent_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .layer(TraceLayer::new_for_http())
        // ハンドラ内の panic を 500 に変換し、プロセスを巻き込まない
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

pub async fn submit_consent_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = RequestContext::from_headers(&headers);

    // 拒否した呼び出し元に Allow-Origin をエコーしない
    let Some(origin) = resolve_allowed_origin(&ctx, &state.allowlist) else {
        return AppError::OriginNotAllowed.into_response();
    };

    let response = match handle_submission(&state, &ctx, &body).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    };
    with_cors_headers(response, &origin)
}

async fn handle_submission(state: &AppState, ctx: &RequestContext, body: &Bytes) -> AppResult<()> {
    if ctx.content_length.is_some_and(|length| length > MAX_BODY_BYTES) {
        return Err(AppError::MalformedRequest(
            "Request body too large".to_string(),
        ));
    }

    let raw: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::MalformedRequest("Request body must be valid JSON".to_string()))?;

    state.consent_service.submit(&raw, ctx).await
}

/// CORS preflight. Short-circuits before any validation or persistence.
pub async fn preflight_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = RequestContext::from_headers(&headers);
    match resolve_allowed_origin(&ctx, &state.allowlist) {
        Some(origin) => with_cors_headers(StatusCode::NO_CONTENT.into_response(), &origin),
        None => AppError::OriginNotAllowed.into_response(),
    }
}

pub async fn method_not_allowed_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method not allowed".to_string(),
        }),
    )
        .into_response();

    let ctx = RequestContext::from_headers(&headers);
    match resolve_allowed_origin(&ctx, &state.allowlist) {
        Some(origin) => with_cors_headers(response, &origin),
        None => response,
    }
}

fn with_cors_headers(mut response: Response, origin: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(origin) {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("86400"),
        );
    }
    response
}
