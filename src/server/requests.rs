//! Request bodies and their validation

use serde::Deserialize;

use super::error::ApiError;
use crate::utils::is_valid_url;

/// Body of `POST /api/scrapper/urls`
#[derive(Debug, Default, Deserialize)]
pub struct CrawlRequest {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Whether a crawl request starts a session or resumes one
#[derive(Debug, PartialEq, Eq)]
pub enum CrawlTarget {
    Start(String),
    Resume(String),
}

impl CrawlRequest {
    pub fn target(self) -> Result<CrawlTarget, ApiError> {
        let url = non_blank(self.url);
        let token = non_blank(self.token);
        match (url, token) {
            (Some(_), Some(_)) => Err(ApiError::BadRequest(
                "Provide either url or token, not both".into(),
            )),
            (Some(url), None) => Ok(CrawlTarget::Start(url)),
            (None, Some(token)) => Ok(CrawlTarget::Resume(token)),
            (None, None) => Err(ApiError::BadRequest("Missing URL".into())),
        }
    }
}

/// Body of `POST /api/scrapper/url-data`
#[derive(Debug, Default, Deserialize)]
pub struct StreamRequest {
    pub urls: Option<Vec<String>>,
}

impl StreamRequest {
    /// Input order is kept and duplicates are not removed. Malformed
    /// entries are dropped; a list with nothing left is rejected.
    pub fn into_urls(self) -> Result<Vec<String>, ApiError> {
        let urls = self.urls.unwrap_or_default();
        if urls.is_empty() {
            return Err(ApiError::BadRequest("Missing URL".into()));
        }
        let total = urls.len();
        let valid: Vec<String> = urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| is_valid_url(url))
            .collect();
        if valid.len() < total {
            tracing::debug!("Dropped {} malformed URLs from stream request", total - valid.len());
        }
        if valid.is_empty() {
            return Err(ApiError::BadRequest("Missing URL".into()));
        }
        Ok(valid)
    }
}

/// Body of `POST /api/scrapper/sitemap-urls`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapRequest {
    pub sitemap_url: Option<String>,
}

impl SitemapRequest {
    pub fn into_url(self) -> Result<String, ApiError> {
        non_blank(self.sitemap_url).ok_or_else(|| ApiError::BadRequest("Missing sitemap URL".into()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
