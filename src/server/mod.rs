//! HTTP surface: crawl, stream and sitemap endpoints under `/api/scrapper`.

pub mod backend;
pub mod error;
pub mod handlers;
pub mod requests;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use reqwest::Client;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use backend::{ChromiumBackend, ChunkSink, CrawlBackend, RendererBackend};
pub use error::ApiError;

use crate::config::{CrawlConfig, ServerConfig};
use crate::session::SessionStore;

/// Shared state for every handler
pub struct AppState<B> {
    pub backend: Arc<B>,
    pub sessions: Arc<SessionStore>,
    /// Client for sitemap fetches
    pub http: Client,
}

// Manual impl: derive would require `B: Clone`
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            sessions: Arc::clone(&self.sessions),
            http: self.http.clone(),
        }
    }
}

impl<B: CrawlBackend> AppState<B> {
    /// State with a fresh session store sized by `config`
    pub fn new(backend: B, config: &CrawlConfig) -> Result<Self> {
        let http = crate::sitemap::build_client().context("Failed to build sitemap client")?;
        Ok(Self {
            backend: Arc::new(backend),
            sessions: Arc::new(SessionStore::new(config.session_ttl())),
            http,
        })
    }
}

/// Routes without middleware
pub fn routes<B: CrawlBackend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/scrapper/urls", post(handlers::crawl_urls::<B>))
        .route("/api/scrapper/url-data", post(handlers::url_data::<B>))
        .route("/api/scrapper/sitemap-urls", post(handlers::sitemap_urls::<B>))
        .with_state(state)
}

/// Routes plus CORS for `cors_origin` and request tracing
pub fn router<B: CrawlBackend>(state: AppState<B>, cors_origin: &str) -> Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {cors_origin}"))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Ok(routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Bind `0.0.0.0:{port}` and serve until the process is stopped
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = AppState::new(ChromiumBackend::new(config.crawl.clone()), &config.crawl)?;
    let _cleanup = Arc::clone(&state.sessions).start_cleanup_task();
    let app = router(state, &config.cors_origin)?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server is running on port {}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
