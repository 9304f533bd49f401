//! Resolver settings and region selection

use std::time::Duration;

use crate::naming::DEFAULT_NAME_PREFIX;

/// Region used when nothing else names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default bound on lookups in flight at once
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Explicit settings for one configuration resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Region the deployment lives in
    pub region: String,
    /// Prefix shared by every stack name
    pub name_prefix: String,
    /// Maximum number of registry/secret lookups in flight
    pub max_concurrent_lookups: usize,
    /// Deadline for a whole resolution
    pub timeout: Option<Duration>,
}

impl ResolverSettings {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            timeout: None,
        }
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Set the lookup concurrency (clamped to at least one)
    pub fn with_max_concurrent_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_lookups = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Region named by `AWS_REGION`, then `AWS_DEFAULT_REGION`
fn env_region(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["AWS_REGION", "AWS_DEFAULT_REGION"]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Pick the region: explicit flag, then config file, then environment, then the default
pub fn resolve_region(explicit: Option<&str>, from_file: Option<&str>) -> String {
    resolve_region_with(explicit, from_file, |name| std::env::var(name).ok())
}

/// Same as [`resolve_region`] with an injectable environment lookup
pub fn resolve_region_with(
    explicit: Option<&str>,
    from_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> String {
    [explicit, from_file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| env_region(env))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
