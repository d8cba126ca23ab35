//! Crawl Engine Module
//!
//! Frontier management, concurrency-bounded rendering, cooperative
//! cancellation and the two dispatchers built on them: the link crawl over a
//! resumable session and the text stream over a fixed URL list.

pub mod cancellation;
pub mod cleanup;
pub mod crawl_types;
pub mod frontier;
pub mod orchestrator;
pub mod page_timeout;
pub mod renderer;
pub mod streaming;

pub use cancellation::{CrawlCancellation, DisconnectGuard};
pub use cleanup::CleanupResult;
pub use crawl_types::{
    CancelReason, CrawlError, CrawlResult, CrawlSummary, RenderMode, RenderOutcome, StreamChunk,
};
pub use frontier::Frontier;
pub use orchestrator::{crawl_site, run_crawl};
pub use renderer::{ChromiumRenderer, PageGuard, PageRenderer, render};
pub use streaming::{StreamStats, stream_extract, stream_site_text};
