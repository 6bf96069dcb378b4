//! Audio byte-stream relay.
//!
//! # Responsibilities
//! - Validate the target URL and its host against the source policy
//! - Present the host-specific `Referer`/`Origin`/`User-Agent`
//! - Forward `Range` and stream the media body back unbuffered
//!
//! # Design Decisions
//! - The host allow-list is the security boundary: the relay is not an open proxy
//! - Audio is cacheable for an hour unless the upstream says otherwise

use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::Response;

use crate::error::{RelayError, RelayResult};
use crate::http::response::{cors_headers, stream_upstream};
use crate::relay::target::{normalize_target_url, ParsedTarget};
use crate::relay::upstream::UpstreamHeaders;
use crate::relay::Relay;

pub const AUDIO_CACHE_CONTROL: &str = "public, max-age=3600";

/// A validated audio request, ready to be sent upstream.
#[derive(Debug, Clone)]
pub struct AudioRequest {
    pub target: ParsedTarget,
    pub headers: UpstreamHeaders,
}

impl Relay {
    /// Validate the target and build upstream headers without touching the network.
    pub fn prepare_audio(
        &self,
        target: &str,
        source: Option<&str>,
        inbound: &HeaderMap,
    ) -> RelayResult<AudioRequest> {
        let target = normalize_target_url(target).inspect_err(|_| {
            tracing::warn!(target = %target, "Rejected invalid target");
        })?;

        let source = source
            .map(str::to_ascii_lowercase)
            .filter(|s| !s.is_empty());
        let hostname = target.hostname();

        if !self.policy.is_host_allowed(source.as_deref(), hostname) {
            tracing::warn!(host = %hostname, source = ?source, "Target host not allowed");
            return Err(RelayError::HostNotAllowed);
        }

        let referer = self.policy.referer_for(source.as_deref(), hostname);
        let headers = UpstreamHeaders::audio(inbound, referer, &self.default_user_agent);

        Ok(AudioRequest { target, headers })
    }

    /// Relay an audio request. `method` is GET or HEAD.
    pub async fn relay_audio(
        &self,
        method: Method,
        target: &str,
        source: Option<&str>,
        inbound: &HeaderMap,
    ) -> RelayResult<Response> {
        let AudioRequest { target, headers } = self.prepare_audio(target, source, inbound)?;

        tracing::debug!(
            upstream = %target.url(),
            method = %method,
            range = ?headers.get(axum::http::header::RANGE),
            "Relaying audio"
        );

        let upstream = self
            .media_client
            .request(method, target.into_url())
            .headers(headers.into_inner())
            .send()
            .await?;

        let headers = cors_headers(
            Some(upstream.headers()),
            HeaderValue::from_static(AUDIO_CACHE_CONTROL),
        );

        Ok(stream_upstream(upstream, headers))
    }
}
