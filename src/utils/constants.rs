//! Shared configuration constants for the site mapper
//!
//! Default values used by the config builder, the renderer and the session
//! store. Keeping them here avoids magic numbers spread across modules.

/// Default number of pages rendered at the same time within one crawl.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Upper bound accepted by the config builder for any concurrency limit.
///
/// Each slot is an open Chromium tab, so this caps memory per invocation.
pub const MAX_CONCURRENCY_LIMIT: usize = 50;

/// Default wall-clock budget for a single crawl invocation: 20 seconds
///
/// When it elapses the crawl stops dispatching and returns a partial result
/// with a non-zero `remainingQueue` that can be resumed with the same token.
pub const DEFAULT_CRAWL_TIME_LIMIT_SECS: u64 = 20;

/// Per-navigation timeout for `page.goto()`: 30 seconds
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Timeout for a single DOM evaluation script
pub const DEFAULT_EVALUATE_TIMEOUT_SECS: u64 = 10;

/// Settle delay after navigation so client-side routers can render links
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Idle TTL for crawl sessions: one hour since last access
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// How often the session store sweeps expired sessions
pub const SESSION_CLEANUP_INTERVAL_SECS: u64 = 60;

/// Chrome user agent string sent by the rendering browser
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
