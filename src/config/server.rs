//! Environment-driven settings for the HTTP binary

use anyhow::{Context, Result};
use std::str::FromStr;

use super::types::CrawlConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Settings read from the process environment (and `.env`, when present)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origin: String,
    pub crawl: CrawlConfig,
}

impl ServerConfig {
    /// Load settings from `PORT`, `CORS_ORIGIN`, `CRAWL_CONCURRENCY`,
    /// `STREAM_CONCURRENCY`, `CRAWL_TIME_LIMIT_SECS` and `SESSION_TTL_SECS`.
    ///
    /// `CRAWL_TIME_LIMIT_SECS=0` disables the crawl deadline.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let mut builder = CrawlConfig::builder();
        if let Some(limit) = parse_var::<usize>(&lookup, "CRAWL_CONCURRENCY")? {
            builder = builder.concurrency_limit(limit);
        }
        if let Some(limit) = parse_var::<usize>(&lookup, "STREAM_CONCURRENCY")? {
            builder = builder.stream_concurrency_limit(limit);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CRAWL_TIME_LIMIT_SECS")? {
            builder = builder.crawl_time_limit_secs((secs > 0).then_some(secs));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SESSION_TTL_SECS")? {
            builder = builder.session_ttl_secs(secs);
        }

        Ok(Self {
            port,
            cors_origin,
            crawl: builder.build().context("Invalid crawl configuration")?,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value: {raw:?}"))
        })
        .transpose()
}
