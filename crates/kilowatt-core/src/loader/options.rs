use std::fmt;
use std::time::Duration;

use crate::config::DataConfig;

/// Default freshness window for cached resources.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Per-call loader behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Zero disables caching entirely.
    pub ttl: Duration,
    /// When false the remote stage is skipped even if a remote fetch is supplied.
    pub use_remote_first: bool,
    /// When false a remote failure ends the load without trying the fallback.
    pub allow_fallback_on_remote_failure: bool,
    /// Applied separately to the remote and the fallback stage. A remote
    /// stage includes every rate-limit retry the API client makes.
    pub stage_timeout: Option<Duration>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            use_remote_first: true,
            allow_fallback_on_remote_failure: true,
            stage_timeout: None,
        }
    }
}

impl LoadOptions {
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            ttl: Duration::from_millis(config.cache_ttl_ms),
            use_remote_first: config.use_backend_api,
            allow_fallback_on_remote_failure: config.fallback_to_json,
            stage_timeout: (config.stage_timeout_ms > 0)
                .then(|| Duration::from_millis(config.stage_timeout_ms)),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn remote_first(mut self, enabled: bool) -> Self {
        self.use_remote_first = enabled;
        self
    }

    pub fn fallback_on_remote_failure(mut self, allowed: bool) -> Self {
        self.allow_fallback_on_remote_failure = allowed;
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }
}

/// Which source served a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Cache,
    Remote,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Cache => "cache",
            DataSource::Remote => "remote",
            DataSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
