//! Test utilities shared by the sitemapper integration tests
//!
//! `ScriptedSite` is a `PageRenderer` over an in-memory site: every URL maps
//! to a page with fixed links, text and navigation delay. It counts open tabs
//! so tests can check the concurrency cap and that every tab is released.

use anyhow::{Result, anyhow};
use kodegen_tools_sitemapper::PageRenderer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    pub links: Vec<String>,
    pub text: String,
    pub delay: Duration,
    /// Navigation fails after `delay`, like a page-load timeout
    pub fail: bool,
}

#[allow(dead_code)]
impl ScriptedPage {
    pub fn links(links: &[&str]) -> Self {
        Self {
            links: links.iter().map(|l| (*l).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct Counters {
    open: AtomicUsize,
    max_open: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

#[derive(Debug, Default)]
pub struct ScriptedSite {
    pages: HashMap<String, ScriptedPage>,
    counters: Arc<Counters>,
    navigations: Mutex<Vec<String>>,
    extractions: Mutex<Vec<String>>,
}

/// Open tab; decrements the open counter however it goes away
pub struct ScriptedTab {
    url: OnceLock<String>,
    counters: Arc<Counters>,
}

impl Drop for ScriptedTab {
    fn drop(&mut self) {
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: ScriptedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn open_now(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst)
    }

    pub fn max_open(&self) -> usize {
        self.counters.max_open.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    /// URLs whose DOM was evaluated, in completion order
    pub fn extractions(&self) -> Vec<String> {
        self.extractions.lock().unwrap().clone()
    }

    pub fn navigation_count(&self, url: &str) -> usize {
        self.navigations().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn extraction_count(&self, url: &str) -> usize {
        self.extractions().iter().filter(|u| u.as_str() == url).count()
    }

    fn lookup(&self, tab: &ScriptedTab) -> Result<(&str, &ScriptedPage)> {
        let url = tab.url.get().ok_or_else(|| anyhow!("Tab was never navigated"))?;
        let (url, page) = self
            .pages
            .get_key_value(url)
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
        Ok((url.as_str(), page))
    }
}

impl PageRenderer for ScriptedSite {
    type Page = ScriptedTab;

    async fn open_page(&self) -> Result<ScriptedTab> {
        let now = self.counters.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_open.fetch_max(now, Ordering::SeqCst);
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedTab {
            url: OnceLock::new(),
            counters: Arc::clone(&self.counters),
        })
    }

    async fn navigate(&self, page: &ScriptedTab, url: &str) -> Result<()> {
        self.navigations.lock().unwrap().push(url.to_string());
        let _ = page.url.set(url.to_string());
        let (_, scripted) = self.lookup(page)?;
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        if scripted.fail {
            return Err(anyhow!("Page navigation timeout after 30 seconds"));
        }
        Ok(())
    }

    async fn extract_links(&self, page: &ScriptedTab) -> Result<Vec<String>> {
        let (url, scripted) = self.lookup(page)?;
        self.extractions.lock().unwrap().push(url.to_string());
        Ok(scripted.links.clone())
    }

    async fn extract_text(&self, page: &ScriptedTab) -> Result<String> {
        let (url, scripted) = self.lookup(page)?;
        self.extractions.lock().unwrap().push(url.to_string());
        Ok(scripted.text.clone())
    }

    async fn close_page(&self, page: ScriptedTab) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        drop(page);
    }
}
