//! Job service configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Job service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Maximum extractions running at once
    pub max_concurrent_jobs: usize,
    /// Delay between polls in milliseconds
    pub poll_interval_ms: u64,
    /// Polls before giving up
    pub poll_max_attempts: u32,
    /// Jobs returned by listings
    pub list_limit: usize,
}

impl JobsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With concurrency limit (at least one)
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With poll attempt cap
    #[inline]
    #[must_use]
    pub fn with_poll_max_attempts(mut self, attempts: u32) -> Self {
        self.poll_max_attempts = attempts;
        self
    }

    /// With listing limit
    #[inline]
    #[must_use]
    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit;
        self
    }

    /// Delay between polls
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 8,
            poll_interval_ms: 1000,
            poll_max_attempts: 30,
            list_limit: 50,
        }
    }
}
