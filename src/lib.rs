pub mod browser_setup;
pub mod config;
pub mod crawl_engine;
pub mod server;
pub mod session;
pub mod sitemap;
pub mod utils;

pub use browser_setup::{BrowserWrapper, download_managed_browser, find_browser_executable, launch_browser};
pub use config::{CrawlConfig, CrawlConfigBuilder, ServerConfig};
pub use crawl_engine::{
    CancelReason, ChromiumRenderer, CrawlCancellation, CrawlError, CrawlResult, CrawlSummary,
    Frontier, PageRenderer, RenderMode, RenderOutcome, StreamChunk, StreamStats, crawl_site,
    run_crawl, stream_extract, stream_site_text,
};
pub use session::{CrawlSession, SessionStore};
pub use utils::normalize_url;
