//! Response handling and transformation.
//!
//! # Responsibilities
//! - Filter upstream response headers down to a fixed safe set
//! - Inject `Cache-Control` when the upstream sent none
//! - Add permissive CORS headers and answer pre-flight requests
//! - Stream upstream bodies to the client without buffering
//!
//! # Design Decisions
//! - Allow-list, not deny-list: cookies and upstream security headers never pass
//! - `Access-Control-Allow-Origin: *` is written last and always wins
//! - Unrecognized responses default to `no-store`

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;

use crate::error::ALLOWED_METHODS;

/// Upstream headers that may reach the client.
pub const SAFE_RESPONSE_HEADERS: [HeaderName; 8] = [
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::ACCEPT_RANGES,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ETAG,
    header::LAST_MODIFIED,
    header::EXPIRES,
];

/// Default for responses whose cacheability is unknown.
pub const NO_STORE: &str = "no-store";

/// Pre-flight cache lifetime advertised to browsers, in seconds.
pub const PREFLIGHT_MAX_AGE_SECS: u64 = 86_400;

/// Build client-facing headers from upstream headers.
///
/// `fallback_cache_control` is used when no `Cache-Control` survives filtering.
pub fn cors_headers(upstream: Option<&HeaderMap>, fallback_cache_control: HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(upstream) = upstream {
        for name in SAFE_RESPONSE_HEADERS.iter() {
            for value in upstream.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, fallback_cache_control);
    }

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}

/// Fixed answer to a CORS pre-flight (`OPTIONS`) request.
pub fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(PREFLIGHT_MAX_AGE_SECS));
    response
}

/// Pipe an upstream response to the client with the given headers.
///
/// The body is forwarded chunk by chunk; dropping the returned response
/// drops the upstream connection.
pub fn stream_upstream(upstream: reqwest::Response, headers: HeaderMap) -> Response {
    let status = upstream.status();
    let url = upstream.url().clone();
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(upstream = %url, error = %e, "Upstream body stream failed");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
