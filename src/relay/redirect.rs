//! Redirect handling for media hosts.
//!
//! # Responsibilities
//! - Re-check every redirect hop against the policy allow-list
//! - Keep the injected `Referer`/`Origin` across hops (no automatic referer)
//!
//! # Design Decisions
//! - The media client is shared across sources, so hops are checked against the
//!   aggregate allow-list
//! - A hop outside the allow-list fails the request instead of being followed

use std::sync::Arc;

use reqwest::redirect::{Attempt, Policy};
use url::Url;

use crate::policy::PolicyTable;

/// Hop limit, same as reqwest's default policy.
pub const MAX_REDIRECTS: usize = 10;

/// Returns true if a redirect to `url` may be followed.
pub fn redirect_allowed(policy: &PolicyTable, url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url
            .host_str()
            .is_some_and(|host| policy.is_host_allowed(None, host))
}

/// Redirect policy for the media client.
pub fn media_redirect_policy(policy: Arc<PolicyTable>) -> Policy {
    Policy::custom(move |attempt: Attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if redirect_allowed(&policy, attempt.url()) {
            attempt.follow()
        } else {
            tracing::warn!(location = %attempt.url(), "Redirect to host outside allow-list");
            attempt.error("redirect target host not allowed")
        }
    })
}

/// Client for allow-listed media hosts.
pub fn media_client(policy: Arc<PolicyTable>) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .no_proxy()
        .referer(false)
        .redirect(media_redirect_policy(policy))
        .build()
}

/// Client for the search API.
pub fn api_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().no_proxy().referer(false).build()
}
