//! Search API relay.
//!
//! # Responsibilities
//! - Rewrite inbound query parameters onto the fixed API base URL
//! - Drop routing-only parameters (`target`, `callback`)
//! - Require `types` and stream back the upstream JSON
//!
//! # Design Decisions
//! - Every other parameter (including `source`) is forwarded verbatim, in order
//! - `callback` is never forwarded so JSONP wrapping cannot be triggered through the relay

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use url::Url;

use crate::error::{RelayError, RelayResult};
use crate::http::response::{cors_headers, stream_upstream, NO_STORE};
use crate::relay::query::QueryParams;
use crate::relay::upstream::UpstreamHeaders;
use crate::relay::Relay;

/// Parameters consumed by the relay itself.
pub const ROUTING_PARAMS: [&str; 2] = ["target", "callback"];

/// Parameter the search API cannot do without.
pub const REQUIRED_PARAM: &str = "types";

pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Build the upstream API URL from the inbound query.
pub fn build_api_url(base: &Url, params: &QueryParams) -> RelayResult<Url> {
    let mut url = base.clone();
    let mut has_required = false;

    {
        let mut query = url.query_pairs_mut();
        for (name, value) in params.iter() {
            if ROUTING_PARAMS.contains(&name) {
                continue;
            }
            has_required |= name == REQUIRED_PARAM;
            query.append_pair(name, value);
        }
    }

    if !has_required {
        return Err(RelayError::MissingParameter(REQUIRED_PARAM));
    }

    Ok(url)
}

impl Relay {
    /// Relay a search API query.
    pub async fn relay_api(&self, params: &QueryParams, inbound: &HeaderMap) -> RelayResult<Response> {
        let url = build_api_url(&self.api_base, params)?;
        let headers = UpstreamHeaders::api(inbound, &self.default_user_agent);

        tracing::debug!(upstream = %url, "Relaying API query");

        let upstream = self
            .api_client
            .get(url)
            .headers(headers.into_inner())
            .send()
            .await?;

        let mut headers = cors_headers(Some(upstream.headers()), HeaderValue::from_static(NO_STORE));
        if !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }

        Ok(stream_upstream(upstream, headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://music-api.gdstudio.xyz/api.php").unwrap()
    }

    #[test]
    fn test_strips_routing_params() {
        let params = QueryParams::parse(Some("types=song&callback=jsonp123&source=x"));
        let url = build_api_url(&base(), &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://music-api.gdstudio.xyz/api.php?types=song&source=x"
        );
    }

    #[test]
    fn test_preserves_order_and_encoding() {
        let params = QueryParams::parse(Some("types=search&name=hello+world&count=20&target=&pages=1"));
        let url = build_api_url(&base(), &params).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("types".to_string(), "search".to_string()),
                ("name".to_string(), "hello world".to_string()),
                ("count".to_string(), "20".to_string()),
                ("pages".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_types() {
        let params = QueryParams::parse(Some("name=test"));
        assert!(matches!(
            build_api_url(&base(), &params),
            Err(RelayError::MissingParameter("types"))
        ));

        let params = QueryParams::parse(None);
        assert!(build_api_url(&base(), &params).is_err());
    }

    #[test]
    fn test_base_query_is_kept() {
        let base = Url::parse("http://127.0.0.1:9000/api.php?key=abc").unwrap();
        let params = QueryParams::parse(Some("types=url&id=1"));
        let url = build_api_url(&base, &params).unwrap();
        assert_eq!(url.query(), Some("key=abc&types=url&id=1"));
    }
}
