//! Request relay subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → dispatch.rs (method + query shape)
//!     → audio.rs (target.rs → policy table → upstream.rs)
//!       or api.rs (query rewrite → upstream.rs)
//!     → upstream fetch (single await point)
//!     → http::response (safe headers + CORS, streamed body)
//! ```
//!
//! # Design Decisions
//! - Stateless: each request is independent, the only shared data is read-only
//! - No retries, no timeouts, no caching: upstream failures surface as-is
//! - Bodies are streamed, memory use does not depend on payload size

pub mod api;
pub mod audio;
pub mod dispatch;
pub mod query;
pub mod redirect;
pub mod target;
pub mod upstream;

use std::sync::Arc;

use axum::http::HeaderValue;
use url::Url;

use crate::config::{ConfigError, UpstreamConfig, ValidationError};
use crate::policy::PolicyTable;

pub use dispatch::{classify, Route};
pub use target::{normalize_target_url, ParsedTarget};
pub use upstream::UpstreamHeaders;

/// Everything a request handler needs. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Relay {
    api_client: reqwest::Client,
    media_client: reqwest::Client,
    policy: Arc<PolicyTable>,
    api_base: Url,
    default_user_agent: HeaderValue,
}

impl Relay {
    /// Build a relay with fresh pooled clients.
    pub fn from_config(config: &UpstreamConfig, policy: PolicyTable) -> Result<Self, ConfigError> {
        let api_base = Url::parse(&config.api_base_url)
            .map_err(|_| ValidationError::ApiBaseUrl(config.api_base_url.clone()))?;
        let default_user_agent = HeaderValue::from_str(&config.default_user_agent)
            .map_err(|_| ValidationError::UserAgent)?;

        let policy = Arc::new(policy);

        Ok(Self {
            api_client: redirect::api_client()?,
            media_client: redirect::media_client(policy.clone())?,
            policy,
            api_base,
            default_user_agent,
        })
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }
}
