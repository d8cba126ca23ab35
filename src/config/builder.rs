//! Builder for `CrawlConfig`
//!
//! Every field has a default, so the builder can be finished at any point.
//! Range checks run once in [`CrawlConfigBuilder::build`].

use anyhow::{Result, anyhow};
use std::path::PathBuf;

use super::types::CrawlConfig;
use crate::utils::MAX_CONCURRENCY_LIMIT;

#[derive(Debug, Clone, Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }
}

impl CrawlConfigBuilder {
    /// Set how many pages a crawl renders at once
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_sitemapper::config::CrawlConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = CrawlConfig::builder()
    ///     .concurrency_limit(8)
    ///     .build()?;
    /// assert_eq!(config.concurrency_limit(), 8);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.config.concurrency_limit = limit;
        self
    }

    #[must_use]
    pub fn stream_concurrency_limit(mut self, limit: usize) -> Self {
        self.config.stream_concurrency_limit = limit;
        self
    }

    /// Set the per-invocation crawl deadline, or `None` to crawl until done
    #[must_use]
    pub fn crawl_time_limit_secs(mut self, secs: Option<u64>) -> Self {
        self.config.crawl_time_limit_secs = secs;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn evaluate_timeout_secs(mut self, secs: u64) -> Self {
        self.config.evaluate_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn session_ttl_secs(mut self, secs: u64) -> Self {
        self.config.session_ttl_secs = secs;
        self
    }

    /// Set browser headless mode
    ///
    /// Headed mode is only useful while debugging a renderer locally. It needs
    /// a display server and is forced off in release builds.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.chrome_data_dir = Some(dir.into());
        self
    }

    /// Validate ranges and produce the final config
    ///
    /// # Errors
    ///
    /// Returns an error when a concurrency limit is outside `1..=50`, a
    /// timeout is zero, or the crawl deadline is zero.
    pub fn build(self) -> Result<CrawlConfig> {
        #[cfg_attr(debug_assertions, allow(unused_mut))]
        let mut config = self.config;

        for (name, value) in [
            ("concurrency_limit", config.concurrency_limit),
            ("stream_concurrency_limit", config.stream_concurrency_limit),
        ] {
            if !(1..=MAX_CONCURRENCY_LIMIT).contains(&value) {
                return Err(anyhow!(
                    "{name} must be between 1 and {MAX_CONCURRENCY_LIMIT}, got {value}"
                ));
            }
        }

        if config.page_load_timeout_secs == 0 {
            return Err(anyhow!("page_load_timeout_secs must be greater than zero"));
        }
        if config.evaluate_timeout_secs == 0 {
            return Err(anyhow!("evaluate_timeout_secs must be greater than zero"));
        }
        if config.session_ttl_secs == 0 {
            return Err(anyhow!("session_ttl_secs must be greater than zero"));
        }
        if config.crawl_time_limit_secs == Some(0) {
            return Err(anyhow!(
                "crawl_time_limit_secs must be greater than zero (use None to disable)"
            ));
        }

        // Enforce headless mode in release builds for production safety
        #[cfg(not(debug_assertions))]
        if !config.headless {
            tracing::warn!(
                "Forcing headless mode in release build. \
                Headed mode is only available in debug builds for development."
            );
            config.headless = true;
        }

        Ok(config)
    }
}
