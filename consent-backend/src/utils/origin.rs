// src/utils/origin.rs

use crate::utils::allowlist::{normalize_host, DomainAllowlist};
use axum::http::{header, HeaderMap};
use url::Url;

/// The request headers the pipeline is allowed to look at, pulled out of the
/// axum `HeaderMap` once so the rest of the code never touches ambient
/// request state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub host: Option<String>,
    pub forwarded_proto: Option<String>,
    pub content_length: Option<u64>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: header::HeaderName| {
            headers
                .get(&name)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string())
        };

        Self {
            origin: header_str(header::ORIGIN),
            referer: header_str(header::REFERER),
            host: header_str(header::HOST),
            forwarded_proto: headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string()),
            content_length: headers
                .get(header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok()),
        }
    }
}

/// Resolve the caller origin to echo in CORS headers.
///
/// A present `Origin` header is authoritative: if it is malformed or its
/// host is not allowlisted, resolution fails without falling back to the
/// weaker signals. Browsers omit `Origin` on some fire-and-forget sends
/// (keepalive/beacon), which is what the `Referer` and `Host` fallbacks
/// cover.
pub fn resolve_allowed_origin(ctx: &RequestContext, allowlist: &DomainAllowlist) -> Option<String> {
    if let Some(origin) = &ctx.origin {
        let url = Url::parse(origin).ok()?;
        let host = url.host_str()?;
        if allowlist.is_host_allowed(host) {
            // ブラウザが送った Origin をそのまま返す
            return Some(origin.clone());
        }
        return None;
    }

    if let Some(referer) = &ctx.referer {
        if let Ok(url) = Url::parse(referer) {
            if let Some(host) = url.host_str() {
                if allowlist.is_host_allowed(host) {
                    // Referer はパスを含むため、パース結果から origin を組み立てる
                    return Some(url.origin().ascii_serialization());
                }
            }
        }
    }

    if let Some(host) = &ctx.host {
        if allowlist.is_host_allowed(host) {
            let proto = ctx.forwarded_proto.as_deref().unwrap_or("https");
            return Some(format!("{}://{}", proto, normalize_host(host)));
        }
    }

    None
}
