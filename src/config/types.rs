use serde::Deserialize;

/// Main configuration structure for Skein
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub links: LinksConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub frontier: FrontierConfig,
}

/// What the dispatcher does when no pending record can be claimed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyFrontierPolicy {
    /// Drain in-flight tasks, then stop
    #[default]
    Exit,
    /// Sleep for the idle interval and try again
    Wait,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum depth of records eligible for claiming
    pub max_depth: u32,

    /// Maximum number of fetch tasks in flight
    pub max_concurrent_tasks: u32,

    /// Request timeout for a single fetch (milliseconds)
    pub fetch_timeout_ms: u64,

    pub on_empty_frontier: EmptyFrontierPolicy,

    /// Sleep between claim attempts under the wait policy (milliseconds)
    pub idle_interval_ms: u64,

    /// Age after which a claimed record is returned to pending (0 disables)
    pub claim_lease_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            max_concurrent_tasks: 50,
            fetch_timeout_ms: 5000,
            on_empty_frontier: EmptyFrontierPolicy::Exit,
            idle_interval_ms: 1000,
            claim_lease_secs: 0,
        }
    }
}

/// Link canonicalization options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LinksConfig {
    /// Drop everything from the first `?`
    pub strip_query: bool,

    /// Add host label count to path depth
    pub count_domain_labels: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            strip_query: true,
            count_domain_labels: false,
        }
    }
}

/// Frontier database configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

/// Addresses inserted into the frontier at startup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontierConfig {
    #[serde(default)]
    pub seeds: Vec<String>,
}
