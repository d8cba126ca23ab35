//! Seed lists from XML sitemaps.
//!
//! Only flat `<urlset>` sitemaps are understood: every `<loc>` inside a
//! `<url>` entry is returned in document order. Sitemap indexes yield an
//! empty list.

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use crate::crawl_engine::crawl_types::{CrawlError, CrawlResult};
use crate::utils::{CHROME_USER_AGENT, is_valid_url};

const SITEMAP_FETCH_TIMEOUT_SECS: u64 = 30;

static URL_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<url(?:\s[^>]*)?>(.*?)</url>").expect("URL_ENTRY: hardcoded regex is valid")
});

static LOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<loc(?:\s[^>]*)?>\s*(?:<!\[CDATA\[)?\s*(.*?)\s*(?:\]\]>)?\s*</loc>")
        .expect("LOC: hardcoded regex is valid")
});

/// Pull page URLs out of a `<urlset>` document
#[must_use]
pub fn extract_sitemap_urls(xml: &str) -> Vec<String> {
    URL_ENTRY
        .captures_iter(xml)
        .filter_map(|entry| {
            let body = entry.get(1)?.as_str();
            let loc = LOC.captures(body)?.get(1)?.as_str();
            let decoded = html_escape::decode_html_entities(loc).trim().to_string();
            (!decoded.is_empty()).then_some(decoded)
        })
        .collect()
}

/// HTTP client used for sitemap fetches
pub fn build_client() -> CrawlResult<Client> {
    Client::builder()
        .user_agent(CHROME_USER_AGENT)
        .timeout(Duration::from_secs(SITEMAP_FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| CrawlError::Sitemap(format!("Failed to build HTTP client: {e}")))
}

/// Download `sitemap_url` and return its page URLs
///
/// # Errors
///
/// `InvalidUrl` for a non-http(s) address, `Sitemap` for transport errors
/// and non-success statuses.
pub async fn fetch_sitemap_urls(client: &Client, sitemap_url: &str) -> CrawlResult<Vec<String>> {
    if !is_valid_url(sitemap_url) {
        return Err(CrawlError::InvalidUrl(sitemap_url.to_string()));
    }

    let body = async {
        client
            .get(sitemap_url)
            .send()
            .await
            .context("Failed to fetch sitemap")?
            .error_for_status()
            .context("Sitemap request was rejected")?
            .text()
            .await
            .context("Failed to read sitemap body")
    }
    .await
    .map_err(|e| CrawlError::Sitemap(format!("{e:#}")))?;

    let urls = extract_sitemap_urls(&body);
    log::info!(target: "sitemapper::sitemap", "Sitemap {sitemap_url} listed {} URLs", urls.len());
    Ok(urls)
}
