//! Resumable crawl sessions.

mod store;

pub use store::SessionStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crawl_engine::crawl_types::{CrawlError, CrawlResult};
use crate::crawl_engine::frontier::Frontier;
use crate::utils::{is_valid_url, normalize_url, origin_of};

/// State of one crawl across invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSession {
    token: String,
    /// `scheme://host[:port]` of the seed; links outside it are ignored
    origin: String,
    seed_url: String,
    pub frontier: Frontier,
    created_at: DateTime<Utc>,
    invocations: u32,
}

impl CrawlSession {
    /// Start a session at `seed_url` with a fresh token.
    ///
    /// The seed is queued and recorded as discovered.
    pub fn new(seed_url: &str) -> CrawlResult<Self> {
        if !is_valid_url(seed_url) {
            return Err(CrawlError::InvalidUrl(seed_url.to_string()));
        }
        let seed = normalize_url(seed_url);
        let origin = origin_of(&seed).ok_or_else(|| CrawlError::InvalidUrl(seed_url.to_string()))?;

        let mut frontier = Frontier::new();
        frontier.enqueue(&seed);
        frontier.record_discovered(&seed);

        Ok(Self {
            token: uuid::Uuid::new_v4().to_string(),
            origin,
            seed_url: seed,
            frontier,
            created_at: Utc::now(),
            invocations: 0,
        })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of crawl invocations run against this session
    #[must_use]
    pub fn invocations(&self) -> u32 {
        self.invocations
    }

    pub(crate) fn begin_invocation(&mut self) {
        self.invocations += 1;
    }
}
