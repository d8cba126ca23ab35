//! Main crawl orchestration logic
//!
//! Coordinates one crawl invocation over a session:
//! - Continuous backfill of render tasks up to the concurrency limit
//! - Harvesting discovered links into the session frontier
//! - Deadline and disconnect cancellation
//! - Browser lifecycle for the invocation

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

use super::cancellation::CrawlCancellation;
use super::cleanup::CleanupResult;
use super::crawl_types::{CancelReason, CrawlError, CrawlResult, CrawlSummary, RenderMode, RenderOutcome};
use super::renderer::{ChromiumRenderer, PageRenderer, render};
use crate::browser_setup::launch_browser;
use crate::config::CrawlConfig;
use crate::session::CrawlSession;
use crate::utils::{is_same_origin, normalize_url};

/// Counters for one invocation, logged on completion
#[derive(Debug, Default)]
struct CrawlStats {
    rendered: usize,
    failed: usize,
    abandoned: usize,
    links_seen: usize,
    new_links: usize,
}

/// Run one crawl invocation over `session` with the given renderer.
///
/// The frontier is only touched here, between task completions, so render
/// tasks never see it. Every started task is awaited before returning;
/// renders abandoned by cancellation are put back at the head of the
/// frontier and counted in `remaining_queue`.
pub async fn run_crawl<R: PageRenderer>(
    session: &mut CrawlSession,
    renderer: Arc<R>,
    concurrency_limit: usize,
    cancel: &CrawlCancellation,
) -> CrawlSummary {
    let limit = concurrency_limit.max(1);
    let start_time = Instant::now();
    let mut stats = CrawlStats::default();
    let mut active = FuturesUnordered::new();

    session.begin_invocation();
    info!(
        target: "sitemapper::crawl",
        "Crawl {} (invocation {}): {} queued, {} discovered, concurrency {limit}, time budget {:?}",
        session.token(),
        session.invocations(),
        session.frontier.queued_len(),
        session.frontier.discovered().len(),
        cancel.time_remaining(),
    );

    loop {
        // Fill up to concurrency limit
        while active.len() < limit && !cancel.is_cancelled() {
            let Some(url) = session.frontier.dequeue() else {
                break;
            };
            debug!(target: "sitemapper::crawl", "Dispatching {url}");

            let renderer = Arc::clone(&renderer);
            let task_cancel = cancel.clone();
            let task_url = url.clone();
            let handle = tokio::spawn(async move {
                render(&*renderer, &task_url, RenderMode::Links, &task_cancel).await
            });
            active.push(async move { (url, handle.await) });
        }

        // Wait for at least one task to complete
        let Some((url, joined)) = active.next().await else {
            break;
        };

        match joined {
            Ok(RenderOutcome::Links(links)) => {
                session.frontier.complete(&url);
                stats.rendered += 1;
                stats.links_seen += links.len();
                stats.new_links += harvest_links(session, &links);
            }
            Ok(RenderOutcome::Text(_)) => {
                warn!(target: "sitemapper::crawl", "Renderer returned text in link mode for {url}");
                session.frontier.complete(&url);
                stats.failed += 1;
            }
            Ok(RenderOutcome::Failed(reason)) => {
                warn!(target: "sitemapper::crawl", "Render failed for {url}: {reason}");
                session.frontier.complete(&url);
                stats.failed += 1;
            }
            Ok(RenderOutcome::Cancelled) => {
                session.frontier.requeue(&url);
                stats.abandoned += 1;
            }
            Err(e) => {
                error!(target: "sitemapper::crawl", "Render task for {url} panicked: {e}");
                session.frontier.complete(&url);
                stats.failed += 1;
            }
        }
    }

    if session.frontier.is_drained() {
        cancel.cancel(CancelReason::Completed);
    }

    let summary = CrawlSummary {
        token: session.token().to_string(),
        total_links: session.frontier.discovered().len(),
        links: session.frontier.discovered().to_vec(),
        remaining_queue: session.frontier.queued_len(),
    };

    info!(
        target: "sitemapper::crawl",
        "Crawl {} stopped ({:?}) after {:.2}s: {} rendered, {} failed, {} abandoned, \
         {} links seen ({} new), {} discovered, {} remaining",
        summary.token,
        cancel.reason(),
        start_time.elapsed().as_secs_f64(),
        stats.rendered,
        stats.failed,
        stats.abandoned,
        stats.links_seen,
        stats.new_links,
        summary.total_links,
        summary.remaining_queue,
    );

    summary
}

/// Feed same-origin links into the frontier. Returns how many were new.
fn harvest_links(session: &mut CrawlSession, links: &[String]) -> usize {
    let mut added = 0;
    for link in links {
        let normalized = normalize_url(link);
        if !is_same_origin(&normalized, session.origin()) {
            continue;
        }
        if session.frontier.record_discovered(&normalized) {
            added += 1;
        }
        session.frontier.enqueue(&normalized);
    }
    added
}

/// Launch a browser, crawl `session` with it, and shut the browser down.
///
/// The deadline comes from `config` and starts once the browser is up, so a
/// slow launch or a first-run Chromium download does not use up the crawl
/// budget. `cancel` may additionally be fired by the caller (for example on
/// disconnect).
///
/// # Errors
///
/// Only browser launch failure is an error. Deadline and disconnect yield a
/// partial summary.
pub async fn crawl_site(
    session: &mut CrawlSession,
    config: &CrawlConfig,
    cancel: &CrawlCancellation,
) -> CrawlResult<CrawlSummary> {
    let wrapper = launch_browser(config.headless(), config.chrome_data_dir().cloned())
        .await
        .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;
    let browser = wrapper
        .browser()
        .ok_or_else(|| CrawlError::Browser("Browser closed before crawl started".into()))?;

    let cancel = cancel.deadline_after(config.crawl_time_limit());
    let renderer = Arc::new(ChromiumRenderer::new(browser, config));
    let summary = run_crawl(session, renderer, config.concurrency_limit(), &cancel).await;

    match wrapper.shutdown().await {
        CleanupResult::Success => {
            debug!(target: "sitemapper::crawl", "Browser and data cleanup completed successfully");
        }
        CleanupResult::PartialFailure(errors) => {
            warn!(target: "sitemapper::crawl", "Cleanup completed with failures: {errors:?}");
        }
    }

    Ok(summary)
}
