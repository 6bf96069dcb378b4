//! Immutable source policy table.
//!
//! Maps a lowercase source key (e.g. `kuwo`) to the hostnames its media is
//! served from and the `Referer` those hosts expect. Hosts and referers are
//! looked up independently: a source may carry either one.

use crate::policy::matcher::HostPattern;

/// Policy for one streaming-media provider.
#[derive(Debug, Clone)]
pub struct SourcePolicy {
    key: String,
    hosts: Vec<HostPattern>,
    referer: Option<String>,
}

impl SourcePolicy {
    /// Create a policy entry. The key is normalized to lowercase.
    pub fn new<I, S>(key: impl Into<String>, hosts: I, referer: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into().to_ascii_lowercase(),
            hosts: hosts.into_iter().map(HostPattern::new).collect(),
            referer: referer.map(str::to_string),
        }
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    fn matches_host(&self, hostname: &str) -> bool {
        self.hosts.iter().any(|p| p.matches(hostname))
    }
}

/// Read-only lookup table built once at startup.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    sources: Vec<SourcePolicy>,
    aggregate: Vec<HostPattern>,
}

impl PolicyTable {
    /// Build a table. Source order is kept and used as the referer scan order.
    pub fn new(sources: Vec<SourcePolicy>) -> Self {
        let mut aggregate: Vec<HostPattern> = Vec::new();
        for pattern in sources.iter().flat_map(|s| s.hosts.iter()) {
            if !aggregate.contains(pattern) {
                aggregate.push(pattern.clone());
            }
        }

        Self { sources, aggregate }
    }

    /// The compiled-in providers.
    pub fn builtin() -> Self {
        Self::new(vec![
            SourcePolicy::new("kuwo", ["kuwo.cn"], Some("https://www.kuwo.cn/")),
            SourcePolicy::new(
                "netease",
                ["music.126.net", "music.163.com", "163.com"],
                Some("https://music.163.com/"),
            ),
            SourcePolicy::new(
                "joox",
                [
                    "joox.com",
                    "jooxcdn.com",
                    "qqmusic.qq.com",
                    "stream.qqmusic.qq.com",
                ],
                Some("https://www.joox.com/"),
            ),
        ])
    }

    pub fn sources(&self) -> &[SourcePolicy] {
        &self.sources
    }

    /// Union of every source's host patterns.
    pub fn aggregate(&self) -> &[HostPattern] {
        &self.aggregate
    }

    fn find(&self, key: &str) -> Option<&SourcePolicy> {
        self.sources
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(key))
    }

    /// Host patterns a target must match for the given source key.
    ///
    /// Absent, empty or unknown keys (and known keys without hosts) resolve
    /// to the aggregate allow-list.
    pub fn host_patterns_for(&self, source: Option<&str>) -> &[HostPattern] {
        source
            .filter(|key| !key.is_empty())
            .and_then(|key| self.find(key))
            .map(|s| s.hosts.as_slice())
            .filter(|hosts| !hosts.is_empty())
            .unwrap_or(self.aggregate.as_slice())
    }

    /// Returns true if `hostname` is allowed for the given source key.
    pub fn is_host_allowed(&self, source: Option<&str>, hostname: &str) -> bool {
        self.host_patterns_for(source)
            .iter()
            .any(|p| p.matches(hostname))
    }

    /// Referer to present to the media host.
    ///
    /// A known key with a configured referer wins. Otherwise the first source
    /// (in table order) whose patterns match `hostname` supplies it.
    pub fn referer_for(&self, source: Option<&str>, hostname: &str) -> Option<&str> {
        let explicit = source
            .filter(|key| !key.is_empty())
            .and_then(|key| self.find(key))
            .and_then(SourcePolicy::referer);
        if explicit.is_some() {
            return explicit;
        }

        self.sources
            .iter()
            .find(|s| s.matches_host(hostname))
            .and_then(SourcePolicy::referer)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}
