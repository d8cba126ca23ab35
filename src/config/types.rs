//! Core configuration types for rendered crawling
//!
//! This module contains the main `CrawlConfig` struct that defines the
//! parameters shared by link crawls and text streams.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::{
    DEFAULT_CONCURRENCY_LIMIT, DEFAULT_CRAWL_TIME_LIMIT_SECS, DEFAULT_EVALUATE_TIMEOUT_SECS,
    DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_SESSION_TTL_SECS, DEFAULT_SETTLE_DELAY_MS,
};

/// Main configuration struct for crawl and stream invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of pages rendered simultaneously during a crawl
    ///
    /// This is the only backpressure mechanism: it bounds the number of open
    /// browser tabs and therefore memory and CPU per invocation.
    ///
    /// Default: 5, Range: 1-50
    pub(crate) concurrency_limit: usize,

    /// Maximum number of pages rendered simultaneously while streaming text
    ///
    /// Default: 5, Range: 1-50
    pub(crate) stream_concurrency_limit: usize,

    /// Wall-clock budget for one crawl invocation in seconds
    ///
    /// `None` disables the deadline; the crawl then runs until the frontier
    /// drains or the caller disconnects.
    ///
    /// Default: 20 seconds
    pub(crate) crawl_time_limit_secs: Option<u64>,

    /// Timeout in seconds for `page.goto()` operations
    ///
    /// Prevents hangs on slow DNS, unresponsive servers, or streaming content.
    ///
    /// Default: 30 seconds
    pub(crate) page_load_timeout_secs: u64,

    /// Timeout in seconds for a DOM evaluation script
    ///
    /// Default: 10 seconds
    pub(crate) evaluate_timeout_secs: u64,

    /// Delay after navigation that lets client-side rendering populate links
    ///
    /// Default: 500 milliseconds
    pub(crate) settle_delay_ms: u64,

    /// Idle TTL for resumable crawl sessions, measured from last access
    ///
    /// Default: 3600 seconds (one hour)
    pub(crate) session_ttl_secs: u64,

    /// Run the browser without a window
    ///
    /// Default: true
    pub(crate) headless: bool,

    /// Chrome user data directory path for browser profile isolation
    ///
    /// When unset, every invocation gets a fresh directory under the system
    /// temp dir, which is removed when the browser closes.
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            stream_concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            crawl_time_limit_secs: Some(DEFAULT_CRAWL_TIME_LIMIT_SECS),
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            evaluate_timeout_secs: DEFAULT_EVALUATE_TIMEOUT_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            headless: true,
            chrome_data_dir: None,
        }
    }
}
