//! Core types shared by the crawl dispatcher, the streaming extractor and
//! the HTTP layer.
//!
//! This module contains the error type, the render request/outcome pair and
//! the serialized result shapes returned to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for crawl operations
///
/// Per-page render failures never show up here: they are recovered inside
/// the dispatcher and reported as [`RenderOutcome::Failed`].
#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// Browser could not be launched or driven
    #[error("Browser error: {0}")]
    Browser(String),
    /// A seed URL that cannot start a crawl
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Unknown or expired session token
    #[error("Session not found for the given token.")]
    SessionNotFound,
    /// Another request is crawling this session right now
    #[error("Session is already being crawled.")]
    SessionBusy,
    /// Sitemap fetch or parse failure
    #[error("Sitemap error: {0}")]
    Sitemap(String),
    /// Other errors
    #[error("Crawl error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// What a render task pulls out of the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Absolute `href` of every anchor in the rendered document
    Links,
    /// Visible text with `style`, `script` and `noscript` removed
    Text,
}

/// Result of one render task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Links(Vec<String>),
    Text(String),
    /// Navigation or evaluation failed; the message is for logs only
    Failed(String),
    /// A checkpoint observed cancellation and the task produced nothing
    Cancelled,
}

/// Why an invocation stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelReason {
    /// Wall-clock budget elapsed
    Deadline,
    /// The caller went away
    Disconnected,
    /// No work left
    Completed,
}

/// Snapshot returned by a crawl invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub token: String,
    pub total_links: usize,
    pub links: Vec<String>,
    /// Non-zero means the crawl can be resumed with `token`
    pub remaining_queue: usize,
}

/// One record of the text stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub url: String,
    pub data: String,
}
