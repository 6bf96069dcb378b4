//! Audio target validation.
//!
//! # Responsibilities
//! - Parse the caller-supplied target as an absolute URL
//! - Restrict the scheme to http/https (no `file:`, `data:`, `javascript:`)
//! - Expose the lowercase hostname for allow-list checks

use url::Url;

use crate::error::{RelayError, RelayResult};

/// A target URL that passed scheme validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    url: Url,
}

impl ParsedTarget {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Lowercase hostname. Always present for http(s) URLs.
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}

/// Validate a raw target string.
pub fn normalize_target_url(raw: &str) -> RelayResult<ParsedTarget> {
    let url = Url::parse(raw).map_err(|_| RelayError::InvalidTarget)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelayError::InvalidTarget);
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(RelayError::InvalidTarget);
    }

    Ok(ParsedTarget { url })
}
