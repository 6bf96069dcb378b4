//! Hostname pattern matching.
//!
//! # Responsibilities
//! - Match a hostname against a registered domain (exact match)
//! - Match any subdomain of a registered domain (label boundary aware)
//!
//! # Design Decisions
//! - Matching is case-insensitive (hostnames are normalized to lowercase)
//! - `evilkuwo.cn` never matches `kuwo.cn`: the suffix must start at a label boundary
//! - Every extra label must be non-empty and made of `[a-z0-9-_]`

use std::fmt;

/// A registered domain that admits itself and all of its subdomains.
///
/// Written `*.kuwo.cn` in policy listings; stored as `kuwo.cn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPattern {
    domain: String,
}

impl HostPattern {
    /// Create a pattern for `domain` and every subdomain of it.
    /// A leading `*.` is accepted and ignored.
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into().to_ascii_lowercase();
        let domain = domain
            .strip_prefix("*.")
            .map(str::to_string)
            .unwrap_or(domain);
        Self { domain }
    }

    /// The registered domain, lowercase.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns true if `hostname` is the registered domain or a subdomain of it.
    pub fn matches(&self, hostname: &str) -> bool {
        let hostname = hostname.to_ascii_lowercase();
        if hostname == self.domain {
            return true;
        }

        let Some(prefix) = hostname.strip_suffix(self.domain.as_str()) else {
            return false;
        };
        let Some(labels) = prefix.strip_suffix('.') else {
            return false;
        };

        !labels.is_empty() && labels.split('.').all(is_valid_label)
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*.{}", self.domain)
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}
