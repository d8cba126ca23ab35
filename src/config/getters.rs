//! Getter methods for `CrawlConfig`
//!
//! This module provides all the accessor methods for retrieving configuration
//! values from a `CrawlConfig` instance.

use std::path::PathBuf;
use std::time::Duration;

use super::types::CrawlConfig;

impl CrawlConfig {
    #[must_use]
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    #[must_use]
    pub fn stream_concurrency_limit(&self) -> usize {
        self.stream_concurrency_limit
    }

    #[must_use]
    pub fn crawl_time_limit_secs(&self) -> Option<u64> {
        self.crawl_time_limit_secs
    }

    /// Crawl deadline as a `Duration`, `None` when the crawl is unbounded
    #[must_use]
    pub fn crawl_time_limit(&self) -> Option<Duration> {
        self.crawl_time_limit_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
    }

    #[must_use]
    pub fn evaluate_timeout_secs(&self) -> u64 {
        self.evaluate_timeout_secs
    }

    #[must_use]
    pub fn settle_delay_ms(&self) -> u64 {
        self.settle_delay_ms
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_secs
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }
}
