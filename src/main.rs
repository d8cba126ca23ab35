// HTTP server for rendered-page site mapping.
//
// Serves the crawl, text stream and sitemap endpoints on $PORT.

use anyhow::{Context, Result};
use kodegen_tools_sitemapper::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kodegen_tools_sitemapper=debug,sitemapper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = ServerConfig::from_env().context("Failed to load server configuration")?;
    tracing::info!(
        "Starting sitemapper (concurrency {}, crawl time limit {:?}, session TTL {}s)",
        config.crawl.concurrency_limit(),
        config.crawl.crawl_time_limit(),
        config.crawl.session_ttl_secs(),
    );

    kodegen_tools_sitemapper::server::serve(config).await
}
