//! Route handlers

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info};

use super::AppState;
use super::backend::CrawlBackend;
use super::error::ApiError;
use super::requests::{CrawlRequest, CrawlTarget, SitemapRequest, StreamRequest};
use crate::crawl_engine::{CancelReason, CrawlCancellation, CrawlSummary, StreamChunk};
use crate::sitemap::fetch_sitemap_urls;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Start or resume a crawl and return its snapshot.
///
/// The crawl runs on its own task so the session always goes back into the
/// store, even when the client disconnects and this future is dropped. The
/// drop guard turns that disconnect into a cancellation. The deadline is
/// applied by the backend.
pub async fn crawl_urls<B: CrawlBackend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<CrawlRequest>, JsonRejection>,
) -> Result<Json<CrawlSummary>, ApiError> {
    let Json(request) = payload?;

    let mut session = match request.target()? {
        CrawlTarget::Start(url) => state.sessions.create(&url).await?,
        CrawlTarget::Resume(token) => state.sessions.get(&token).await?,
    };

    let cancel = CrawlCancellation::new();
    let guard = cancel.disconnect_guard();

    let task_state = state.clone();
    let task_cancel = cancel.clone();
    let crawl = tokio::spawn(async move {
        let result = task_state.backend.crawl(&mut session, &task_cancel).await;
        task_state.sessions.put(session).await;
        result
    });

    let joined = crawl.await;
    guard.disarm();

    let summary = joined.map_err(|e| ApiError::Internal(format!("Crawl task failed: {e}")))??;
    Ok(Json(summary))
}

/// Stream `{url, data}` events as each page's text becomes available.
///
/// Dropping the response body (client gone) closes the channel, which the
/// watcher task turns into a cancellation.
pub async fn url_data<B: CrawlBackend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<StreamRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(request) = payload?;
    let urls = request.into_urls()?;

    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let cancel = CrawlCancellation::new();

    let watcher_tx = tx.clone();
    let watcher_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = watcher_tx.closed() => {
                info!("Stream client disconnected");
                watcher_cancel.cancel(CancelReason::Disconnected);
            }
            () = watcher_cancel.cancelled() => {}
        }
    });

    let sink_tx = tx.clone();
    let sink_cancel = cancel.clone();
    let on_result = Box::new(move |chunk: StreamChunk| {
        let event = match Event::default().json_data(&chunk) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to encode stream chunk for {}: {e}", chunk.url);
                return;
            }
        };
        if sink_tx.send(event).is_err() {
            sink_cancel.cancel(CancelReason::Disconnected);
        }
    });

    let backend_state = state.clone();
    tokio::spawn(async move {
        match backend_state.backend.stream(urls, on_result, &cancel).await {
            Ok(stats) => debug!("Stream completed: {stats:?}"),
            Err(e) => {
                error!("Stream failed: {e}");
                let event = Event::default()
                    .event("error")
                    .data(json!({ "error": e.to_string() }).to_string());
                let _ = tx.send(event);
            }
        }
        // Releases the watcher and with it the last sender
        cancel.cancel(CancelReason::Completed);
    });

    let events = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn sitemap_urls<B: CrawlBackend>(
    State(state): State<AppState<B>>,
    payload: Result<Json<SitemapRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let sitemap_url = request.into_url()?;
    let urls = fetch_sitemap_urls(&state.http, &sitemap_url).await?;
    Ok(Json(json!({ "urls": urls })))
}
