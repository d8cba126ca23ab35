//! What the HTTP handlers call to actually render pages.
//!
//! [`ChromiumBackend`] launches one browser per invocation. [`RendererBackend`]
//! reuses a caller-supplied [`PageRenderer`] and owns no browser lifecycle,
//! which is what tests and embedders with their own browser use.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CrawlConfig;
use crate::crawl_engine::{
    CrawlCancellation, CrawlResult, CrawlSummary, PageRenderer, StreamChunk, StreamStats,
    crawl_site, run_crawl, stream_extract, stream_site_text,
};
use crate::session::CrawlSession;

/// Result sink handed to [`CrawlBackend::stream`]
pub type ChunkSink = Box<dyn FnMut(StreamChunk) + Send>;

pub trait CrawlBackend: Send + Sync + 'static {
    /// One crawl invocation. `cancel` carries only the caller's disconnect;
    /// the backend applies the crawl deadline itself once it is ready to
    /// render.
    fn crawl(
        &self,
        session: &mut CrawlSession,
        cancel: &CrawlCancellation,
    ) -> impl Future<Output = CrawlResult<CrawlSummary>> + Send;

    fn stream(
        &self,
        urls: Vec<String>,
        on_result: ChunkSink,
        cancel: &CrawlCancellation,
    ) -> impl Future<Output = CrawlResult<StreamStats>> + Send;
}

/// Backend that launches Chrome for every invocation
#[derive(Debug, Clone)]
pub struct ChromiumBackend {
    config: CrawlConfig,
}

impl ChromiumBackend {
    #[must_use]
    pub fn new(config: CrawlConfig) -> Self {
        Self { config }
    }
}

impl CrawlBackend for ChromiumBackend {
    async fn crawl(
        &self,
        session: &mut CrawlSession,
        cancel: &CrawlCancellation,
    ) -> CrawlResult<CrawlSummary> {
        crawl_site(session, &self.config, cancel).await
    }

    async fn stream(
        &self,
        urls: Vec<String>,
        on_result: ChunkSink,
        cancel: &CrawlCancellation,
    ) -> CrawlResult<StreamStats> {
        stream_site_text(urls, &self.config, on_result, cancel).await
    }
}

/// Backend over an existing renderer
pub struct RendererBackend<R> {
    renderer: Arc<R>,
    concurrency_limit: usize,
    stream_concurrency_limit: usize,
    crawl_time_limit: Option<Duration>,
}

impl<R: PageRenderer> RendererBackend<R> {
    #[must_use]
    pub fn new(renderer: Arc<R>, config: &CrawlConfig) -> Self {
        Self {
            renderer,
            concurrency_limit: config.concurrency_limit(),
            stream_concurrency_limit: config.stream_concurrency_limit(),
            crawl_time_limit: config.crawl_time_limit(),
        }
    }
}

impl<R: PageRenderer> CrawlBackend for RendererBackend<R> {
    async fn crawl(
        &self,
        session: &mut CrawlSession,
        cancel: &CrawlCancellation,
    ) -> CrawlResult<CrawlSummary> {
        let cancel = cancel.deadline_after(self.crawl_time_limit);
        Ok(run_crawl(session, Arc::clone(&self.renderer), self.concurrency_limit, &cancel).await)
    }

    async fn stream(
        &self,
        urls: Vec<String>,
        on_result: ChunkSink,
        cancel: &CrawlCancellation,
    ) -> CrawlResult<StreamStats> {
        Ok(stream_extract(
            urls,
            self.stream_concurrency_limit,
            Arc::clone(&self.renderer),
            on_result,
            cancel,
        )
        .await)
    }
}
