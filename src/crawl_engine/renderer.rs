//! Page rendering behind a trait seam.
//!
//! A [`PageRenderer`] supplies the individual browser steps (open, navigate,
//! extract, close). [`render`] strings them together and owns the
//! cancellation checkpoints, so every renderer honours the same contract:
//!
//! 1. before the page is opened
//! 2. after navigation
//! 3. before DOM evaluation (after the settle delay)
//! 4. after DOM evaluation
//!
//! A task that observes cancellation at any checkpoint closes its page and
//! yields [`RenderOutcome::Cancelled`]. Failures yield
//! [`RenderOutcome::Failed`] and also close the page.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use log::{debug, trace, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::cancellation::CrawlCancellation;
use super::crawl_types::{RenderMode, RenderOutcome};
use super::page_timeout::with_page_timeout;
use crate::config::CrawlConfig;

/// Absolute href of every anchor. `HTMLAnchorElement.href` is already
/// resolved against the document base.
const LINKS_SCRIPT: &str = r"
    (() => Array.from(document.querySelectorAll('a[href]'))
        .map(a => a.href)
        .filter(href => typeof href === 'string' && href.length > 0))()
";

/// Visible text of a detached copy of the body with non-content markup removed
const TEXT_SCRIPT: &str = r"
    (() => {
        const root = document.body || document.documentElement;
        if (!root) return '';
        const clone = root.cloneNode(true);
        clone.querySelectorAll('style, script, noscript').forEach(el => el.remove());
        const text = clone.innerText !== undefined ? clone.innerText : clone.textContent;
        return (text || '').trim();
    })()
";

/// Browser steps used by [`render`]
pub trait PageRenderer: Send + Sync + 'static {
    /// Scoped page resource; must release itself when dropped
    type Page: Send + Sync;

    fn open_page(&self) -> impl Future<Output = Result<Self::Page>> + Send;

    fn navigate(&self, page: &Self::Page, url: &str) -> impl Future<Output = Result<()>> + Send;

    fn extract_links(&self, page: &Self::Page) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn extract_text(&self, page: &Self::Page) -> impl Future<Output = Result<String>> + Send;

    fn close_page(&self, page: Self::Page) -> impl Future<Output = ()> + Send;

    /// Pause between navigation and evaluation for client-side rendering
    fn settle_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Render one URL with the fixed checkpoint contract
pub async fn render<R: PageRenderer>(
    renderer: &R,
    url: &str,
    mode: RenderMode,
    cancel: &CrawlCancellation,
) -> RenderOutcome {
    if cancel.is_cancelled() {
        trace!(target: "sitemapper::render", "Skipping {url}: cancelled before open");
        return RenderOutcome::Cancelled;
    }

    let page = match renderer.open_page().await {
        Ok(page) => page,
        Err(e) => {
            warn!(target: "sitemapper::render", "Failed to open page for {url}: {e:#}");
            return RenderOutcome::Failed(format!("{e:#}"));
        }
    };

    let outcome = drive_page(renderer, &page, url, mode, cancel).await;
    renderer.close_page(page).await;
    outcome
}

async fn drive_page<R: PageRenderer>(
    renderer: &R,
    page: &R::Page,
    url: &str,
    mode: RenderMode,
    cancel: &CrawlCancellation,
) -> RenderOutcome {
    if let Err(e) = renderer.navigate(page, url).await {
        warn!(target: "sitemapper::render", "Navigation failed for {url}: {e:#}");
        return RenderOutcome::Failed(format!("{e:#}"));
    }
    if cancel.is_cancelled() {
        return RenderOutcome::Cancelled;
    }

    let settle = renderer.settle_delay();
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    if cancel.is_cancelled() {
        return RenderOutcome::Cancelled;
    }

    let extracted = match mode {
        RenderMode::Links => renderer.extract_links(page).await.map(RenderOutcome::Links),
        RenderMode::Text => renderer.extract_text(page).await.map(RenderOutcome::Text),
    };
    let outcome = match extracted {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(target: "sitemapper::render", "Evaluation failed for {url}: {e:#}");
            return RenderOutcome::Failed(format!("{e:#}"));
        }
    };

    if cancel.is_cancelled() {
        debug!(target: "sitemapper::render", "Discarding result for {url}: cancelled after evaluation");
        return RenderOutcome::Cancelled;
    }
    outcome
}

/// Owns a browser tab and closes it on every exit path.
///
/// [`PageGuard::close`] is the normal path. If the guard is dropped instead
/// (for example when a request future is torn down mid-render), the close is
/// handed to the runtime.
pub struct PageGuard {
    page: Option<Page>,
}

impl PageGuard {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }

    fn page(&self) -> Result<&Page> {
        self.page.as_ref().context("Page already closed")
    }

    pub async fn close(mut self) {
        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            debug!(target: "sitemapper::render", "Failed to close page: {e}");
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take()
            && let Ok(runtime) = tokio::runtime::Handle::try_current()
        {
            runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    debug!(target: "sitemapper::render", "Failed to close dropped page: {e}");
                }
            });
        }
    }
}

/// [`PageRenderer`] backed by a shared chromiumoxide browser
#[derive(Clone)]
pub struct ChromiumRenderer {
    browser: Arc<Browser>,
    page_load_timeout_secs: u64,
    evaluate_timeout_secs: u64,
    settle_delay: Duration,
}

impl ChromiumRenderer {
    #[must_use]
    pub fn new(browser: Arc<Browser>, config: &CrawlConfig) -> Self {
        Self {
            browser,
            page_load_timeout_secs: config.page_load_timeout_secs(),
            evaluate_timeout_secs: config.evaluate_timeout_secs(),
            settle_delay: config.settle_delay(),
        }
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(
        &self,
        page: &PageGuard,
        script: &str,
        name: &str,
    ) -> Result<T> {
        let page = page.page()?;
        let result = with_page_timeout(
            async {
                page.evaluate(script)
                    .await
                    .map_err(|e| anyhow::anyhow!("{e}"))
            },
            self.evaluate_timeout_secs,
            name,
        )
        .await?;
        result
            .into_value::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to read {name} result: {e}"))
    }
}

impl PageRenderer for ChromiumRenderer {
    type Page = PageGuard;

    async fn open_page(&self) -> Result<PageGuard> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create page")?;
        Ok(PageGuard::new(page))
    }

    async fn navigate(&self, page: &PageGuard, url: &str) -> Result<()> {
        let page = page.page()?;
        with_page_timeout(
            async {
                page.goto(url)
                    .await
                    .map(|_| ())
                    .map_err(|e| anyhow::anyhow!("{e}"))
            },
            self.page_load_timeout_secs,
            "Page navigation",
        )
        .await
    }

    async fn extract_links(&self, page: &PageGuard) -> Result<Vec<String>> {
        self.evaluate(page, LINKS_SCRIPT, "Link extraction").await
    }

    async fn extract_text(&self, page: &PageGuard) -> Result<String> {
        self.evaluate(page, TEXT_SCRIPT, "Text extraction").await
    }

    async fn close_page(&self, page: PageGuard) {
        page.close().await;
    }

    fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}
