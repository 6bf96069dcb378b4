//! Upstream request headers.
//!
//! # Responsibilities
//! - Carry the caller's `User-Agent` or fall back to a browser string
//! - Present the media host's expected `Referer` and matching `Origin`
//! - Forward `Range` verbatim for seekable playback
//!
//! # Design Decisions
//! - Built fresh per request; nothing else from the inbound request leaks upstream
//! - An unparseable referer still goes out, only `Origin` is dropped

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

/// Desktop Chrome UA presented when the caller sends none.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Headers sent to an upstream. Holds at most `User-Agent`, `Referer`,
/// `Origin`, `Range` (audio) or `User-Agent`, `Accept` (API).
#[derive(Debug, Clone, Default)]
pub struct UpstreamHeaders {
    headers: HeaderMap,
}

impl UpstreamHeaders {
    /// Headers for a media host request.
    pub fn audio(inbound: &HeaderMap, referer: Option<&str>, default_user_agent: &HeaderValue) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, user_agent(inbound, default_user_agent));

        if let Some(referer) = referer {
            match HeaderValue::from_str(referer) {
                Ok(value) => {
                    headers.insert(header::REFERER, value);
                    if let Some(origin) = origin_of(referer) {
                        headers.insert(header::ORIGIN, origin);
                    }
                }
                Err(_) => tracing::warn!(referer = %referer, "Referer is not a valid header value"),
            }
        }

        if let Some(range) = inbound.get(header::RANGE) {
            headers.insert(header::RANGE, range.clone());
        }

        Self { headers }
    }

    /// Headers for a search API request.
    pub fn api(inbound: &HeaderMap, default_user_agent: &HeaderValue) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, user_agent(inbound, default_user_agent));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        Self { headers }
    }

    pub fn get(&self, name: header::HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn into_inner(self) -> HeaderMap {
        self.headers
    }
}

fn user_agent(inbound: &HeaderMap, default_user_agent: &HeaderValue) -> HeaderValue {
    inbound
        .get(header::USER_AGENT)
        .cloned()
        .unwrap_or_else(|| default_user_agent.clone())
}

/// `scheme://host[:port]` of the referer, if it parses as a URL with a host.
fn origin_of(referer: &str) -> Option<HeaderValue> {
    let origin = Url::parse(referer).ok()?.origin();
    if !origin.is_tuple() {
        return None;
    }
    HeaderValue::from_str(&origin.ascii_serialization()).ok()
}
