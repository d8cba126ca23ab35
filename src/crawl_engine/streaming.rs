//! Text extraction over a fixed URL list, emitted in completion order.
//!
//! Uses the same continuous-backfill policy as the crawl dispatcher but has
//! no frontier, no dedup and no deadline. Cancellation comes only from the
//! caller going away; once it fires no further render is started, and
//! results of renders still in flight are discarded instead of emitted.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{error, info, warn};
use std::sync::Arc;

use super::cancellation::CrawlCancellation;
use super::cleanup::CleanupResult;
use super::crawl_types::{CrawlError, CrawlResult, RenderMode, RenderOutcome, StreamChunk};
use super::renderer::{ChromiumRenderer, PageRenderer, render};
use crate::browser_setup::launch_browser;
use crate::config::CrawlConfig;

/// Counters for one streaming invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub emitted: usize,
    pub failed: usize,
    /// Finished after cancellation and dropped
    pub discarded: usize,
    /// Never started because cancellation fired first
    pub not_started: usize,
}

/// Render every URL in text mode and hand each result to `on_result`.
///
/// Returns after every started render has finished.
pub async fn stream_extract<R, F>(
    urls: Vec<String>,
    concurrency_limit: usize,
    renderer: Arc<R>,
    mut on_result: F,
    cancel: &CrawlCancellation,
) -> StreamStats
where
    R: PageRenderer,
    F: FnMut(StreamChunk),
{
    let limit = concurrency_limit.max(1);
    let total = urls.len();
    let mut pending = urls.into_iter();
    let mut active = FuturesUnordered::new();
    let mut stats = StreamStats::default();

    info!(target: "sitemapper::stream", "Streaming text for {total} URLs (concurrency {limit})");

    loop {
        while active.len() < limit && !cancel.is_cancelled() {
            let Some(url) = pending.next() else { break };
            let renderer = Arc::clone(&renderer);
            let task_cancel = cancel.clone();
            let task_url = url.clone();
            let handle = tokio::spawn(async move {
                render(&*renderer, &task_url, RenderMode::Text, &task_cancel).await
            });
            active.push(async move { (url, handle.await) });
        }

        let Some((url, joined)) = active.next().await else {
            break;
        };

        match joined {
            Ok(RenderOutcome::Text(data)) if !cancel.is_cancelled() => {
                stats.emitted += 1;
                on_result(StreamChunk { url, data });
            }
            Ok(RenderOutcome::Text(_) | RenderOutcome::Cancelled) => {
                stats.discarded += 1;
            }
            Ok(RenderOutcome::Links(_)) => {
                error!(target: "sitemapper::stream", "Renderer returned links in text mode for {url}");
                stats.failed += 1;
            }
            Ok(RenderOutcome::Failed(reason)) => {
                warn!(target: "sitemapper::stream", "Skipping {url}: {reason}");
                stats.failed += 1;
            }
            Err(e) => {
                error!(target: "sitemapper::stream", "Render task for {url} panicked: {e}");
                stats.failed += 1;
            }
        }
    }

    stats.not_started = pending.len();
    info!(
        target: "sitemapper::stream",
        "Stream finished: {} emitted, {} failed, {} discarded, {} not started",
        stats.emitted, stats.failed, stats.discarded, stats.not_started
    );
    stats
}

/// Launch a browser, stream text for `urls` with it, and shut it down.
///
/// # Errors
///
/// Only browser launch failure is an error.
pub async fn stream_site_text<F>(
    urls: Vec<String>,
    config: &CrawlConfig,
    on_result: F,
    cancel: &CrawlCancellation,
) -> CrawlResult<StreamStats>
where
    F: FnMut(StreamChunk),
{
    let wrapper = launch_browser(config.headless(), config.chrome_data_dir().cloned())
        .await
        .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;
    let browser = wrapper
        .browser()
        .ok_or_else(|| CrawlError::Browser("Browser closed before stream started".into()))?;

    let renderer = Arc::new(ChromiumRenderer::new(browser, config));
    let stats = stream_extract(
        urls,
        config.stream_concurrency_limit(),
        renderer,
        on_result,
        cancel,
    )
    .await;

    if let CleanupResult::PartialFailure(errors) = wrapper.shutdown().await {
        warn!(target: "sitemapper::stream", "Cleanup completed with failures: {errors:?}");
    }

    Ok(stats)
}
