use super::{Error, Result};

/// Tunables of the bootstrapper.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of vertices considered from a single `Ancestors` response.
    pub ancestors_max_containers_received: usize,
    /// Maximum number of `GetAncestors` requests in flight.
    pub max_outstanding_get_ancestors_requests: usize,
    /// Assume the accepted DAG is final and linearize it without contacting peers.
    pub linearize_on_startup: bool,
    /// Processed vertices are cached when `height % stripe_distance < stripe_width`.
    pub stripe_distance: u64,
    pub stripe_width: u64,
    /// Capacity of the cache of processed vertices.
    pub cache_size: usize,
    /// Number of fetched vertices between two progress reports.
    pub status_update_frequency: usize,
    /// Number of bootstrap attempts between two warnings.
    pub retry_bootstrap_warn_frequency: u32,
    /// Percentage of the beacon weight which has to be connected before bootstrapping starts.
    pub startup_percentage: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ancestors_max_containers_received: 2000,
            max_outstanding_get_ancestors_requests: 10,
            linearize_on_startup: false,
            stripe_distance: 2000,
            stripe_width: 5,
            cache_size: 100_000,
            status_update_frequency: 5000,
            retry_bootstrap_warn_frequency: 50,
            startup_percentage: 75,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(Error::InvalidConfig(reason.to_owned()));
        if self.ancestors_max_containers_received == 0 {
            return invalid("ancestors_max_containers_received must be positive");
        }
        if self.max_outstanding_get_ancestors_requests == 0 {
            return invalid("max_outstanding_get_ancestors_requests must be positive");
        }
        if self.stripe_distance == 0 {
            return invalid("stripe_distance must be positive");
        }
        if self.stripe_width > self.stripe_distance {
            return invalid("stripe_width must not exceed stripe_distance");
        }
        if self.cache_size == 0 {
            return invalid("cache_size must be positive");
        }
        if self.status_update_frequency == 0 || self.retry_bootstrap_warn_frequency == 0 {
            return invalid("update frequencies must be positive");
        }
        if self.startup_percentage > 100 {
            return invalid("startup_percentage must be at most 100");
        }
        Ok(())
    }
}
