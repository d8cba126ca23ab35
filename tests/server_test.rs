//! HTTP routes exercised in-process against a scripted site

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use common::{ScriptedPage, ScriptedSite};
use futures::StreamExt;
use kodegen_tools_sitemapper::CrawlConfig;
use kodegen_tools_sitemapper::server::{AppState, RendererBackend, routes};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

type TestState = AppState<RendererBackend<ScriptedSite>>;

fn docs_site() -> ScriptedSite {
    ScriptedSite::new()
        .page(
            "https://example.com/",
            ScriptedPage {
                links: vec![
                    "https://example.com/docs".into(),
                    "https://example.com/blog/".into(),
                    "https://elsewhere.org/".into(),
                ],
                text: "Home".into(),
                ..ScriptedPage::default()
            },
        )
        .page("https://example.com/docs", ScriptedPage::text("Docs"))
        .page("https://example.com/blog", ScriptedPage::text("Blog"))
}

fn state_for(site: Arc<ScriptedSite>, config: &CrawlConfig) -> TestState {
    AppState::new(RendererBackend::new(site, config), config).unwrap()
}

fn test_state() -> TestState {
    let config = CrawlConfig::builder()
        .concurrency_limit(2)
        .stream_concurrency_limit(2)
        .build()
        .unwrap();
    state_for(Arc::new(docs_site()), &config)
}

/// Seed linking to ten pages that take five seconds each
fn slow_site() -> ScriptedSite {
    let urls: Vec<String> = (1..=10).map(|i| format!("https://example.com/p{i}")).collect();
    let links: Vec<&str> = urls.iter().map(String::as_str).collect();
    let mut site = ScriptedSite::new().page("https://example.com/", ScriptedPage::links(&links));
    for url in &urls {
        site = site.page(url, ScriptedPage::default().with_delay(Duration::from_secs(5)));
    }
    site
}

fn json_request(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_json(state: &TestState, path: &str, body: Value) -> (StatusCode, Value) {
    let (status, text) = send(routes(state.clone()), json_request(path, &body)).await;
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(routes(test_state()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_crawl_returns_snapshot_with_token() {
    let state = test_state();

    let (status, body) =
        post_json(&state, "/api/scrapper/urls", json!({"url": "https://example.com"})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["totalLinks"], 3);
    assert_eq!(body["remainingQueue"], 0);
    let mut links: Vec<&str> = body["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    links.sort_unstable();
    assert_eq!(
        links,
        [
            "https://example.com/",
            "https://example.com/blog",
            "https://example.com/docs"
        ]
    );
}

#[tokio::test]
async fn test_resume_reuses_session() {
    let state = test_state();
    let (_, first) =
        post_json(&state, "/api/scrapper/urls", json!({"url": "https://example.com/"})).await;
    let token = first["token"].as_str().unwrap().to_string();

    let (status, second) =
        post_json(&state, "/api/scrapper/urls", json!({"token": token})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["token"], first["token"]);
    assert_eq!(second["totalLinks"], 3);
    assert_eq!(second["remainingQueue"], 0);
    assert_eq!(state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_crawl_request_validation() {
    let state = test_state();

    let (status, body) = post_json(&state, "/api/scrapper/urls", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing URL");

    let (status, _) = post_json(
        &state,
        "/api/scrapper/urls",
        json!({"url": "https://example.com/", "token": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_json(&state, "/api/scrapper/urls", json!({"url": "not a url"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/scrapper/urls")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(routes(test_state()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(serde_json::from_str::<Value>(&body).unwrap()["error"].is_string());
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let state = test_state();
    let (status, body) =
        post_json(&state, "/api/scrapper/urls", json!({"token": "no-such-token"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found for the given token.");
}

#[tokio::test]
async fn test_resume_of_checked_out_session_conflicts() {
    let state = test_state();
    let (_, first) =
        post_json(&state, "/api/scrapper/urls", json!({"url": "https://example.com/"})).await;
    let token = first["token"].as_str().unwrap().to_string();

    let held = state.sessions.get(&token).await.unwrap();
    let (status, _) = post_json(&state, "/api/scrapper/urls", json!({"token": token})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    state.sessions.put(held).await;
}

#[tokio::test]
async fn test_url_data_streams_text_events() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/scrapper/url-data")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"urls": ["https://example.com/docs", "javascript:void(0)", "https://example.com/blog"]})
                .to_string(),
        ))
        .unwrap();

    let response = routes(test_state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    let events: Vec<Value> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();

    assert_eq!(events.len(), 2);
    assert!(events.contains(&json!({"url": "https://example.com/docs", "data": "Docs"})));
    assert!(events.contains(&json!({"url": "https://example.com/blog", "data": "Blog"})));
}

#[tokio::test]
async fn test_url_data_requires_urls() {
    let state = test_state();
    let (status, body) = post_json(&state, "/api/scrapper/url-data", json!({"urls": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing URL");
}

#[tokio::test]
async fn test_sitemap_urls_listed() {
    let mut upstream = mockito::Server::new_async().await;
    let mock = upstream
        .mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/</loc></url>
              <url><loc>https://example.com/docs</loc></url>
            </urlset>"#,
        )
        .create_async()
        .await;

    let state = test_state();
    let (status, body) = post_json(
        &state,
        "/api/scrapper/sitemap-urls",
        json!({"sitemapUrl": format!("{}/sitemap.xml", upstream.url())}),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"urls": ["https://example.com/", "https://example.com/docs"]})
    );
}

#[tokio::test]
async fn test_sitemap_upstream_failure_is_bad_gateway() {
    let mut upstream = mockito::Server::new_async().await;
    let _mock = upstream
        .mock("GET", "/sitemap.xml")
        .with_status(500)
        .create_async()
        .await;

    let state = test_state();
    let (status, body) = post_json(
        &state,
        "/api/scrapper/sitemap-urls",
        json!({"sitemapUrl": format!("{}/sitemap.xml", upstream.url())}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_sitemap_requires_url() {
    let state = test_state();
    let (status, body) = post_json(&state, "/api/scrapper/sitemap-urls", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing sitemap URL");
}

#[tokio::test(start_paused = true)]
async fn test_crawl_deadline_applies_per_invocation() {
    let site = Arc::new(slow_site());
    let config = CrawlConfig::builder()
        .concurrency_limit(2)
        .crawl_time_limit_secs(Some(12))
        .build()
        .unwrap();
    let state = state_for(Arc::clone(&site), &config);

    let (status, first) =
        post_json(&state, "/api/scrapper/urls", json!({"url": "https://example.com/"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["totalLinks"], 11);
    assert_eq!(first["remainingQueue"], 6);

    // The second invocation gets a fresh budget rather than an expired one
    let (_, second) =
        post_json(&state, "/api/scrapper/urls", json!({"token": first["token"]})).await;
    assert_eq!(second["remainingQueue"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_client_disconnect_cancels_crawl_and_keeps_session() {
    let site = Arc::new(slow_site());
    let config = CrawlConfig::builder()
        .concurrency_limit(2)
        .crawl_time_limit_secs(None)
        .build()
        .unwrap();
    let state = state_for(Arc::clone(&site), &config);

    let session = state.sessions.create("https://example.com/").await.unwrap();
    let token = session.token().to_string();
    state.sessions.put(session).await;

    let request = json_request("/api/scrapper/urls", &json!({"token": token}));
    let in_flight = tokio::spawn(routes(state.clone()).oneshot(request));
    tokio::time::sleep(Duration::from_secs(7)).await;
    in_flight.abort();

    // Let the renders that were mid-navigation reach their next checkpoint
    tokio::time::sleep(Duration::from_secs(10)).await;

    // seed + p1, p2 finished; p3, p4 abandoned; nothing started after
    assert_eq!(site.navigations().len(), 5);
    assert_eq!(site.open_now(), 0);
    assert_eq!(site.opened(), site.closed());

    let parked = state.sessions.get(&token).await.unwrap();
    assert_eq!(parked.frontier.queued_len(), 8);
    assert_eq!(parked.frontier.in_flight_len(), 0);
    state.sessions.put(parked).await;

    let (status, resumed) =
        post_json(&state, "/api/scrapper/urls", json!({"token": token})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["totalLinks"], 11);
    assert_eq!(resumed["remainingQueue"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_event_stream_stops_rendering() {
    let site = Arc::new(
        ScriptedSite::new()
            .page(
                "https://example.com/u1",
                ScriptedPage::text("one").with_delay(Duration::from_millis(10)),
            )
            .page(
                "https://example.com/u2",
                ScriptedPage::text("two").with_delay(Duration::from_secs(1)),
            )
            .page(
                "https://example.com/u3",
                ScriptedPage::text("three").with_delay(Duration::from_millis(10)),
            ),
    );
    let config = CrawlConfig::builder()
        .stream_concurrency_limit(1)
        .build()
        .unwrap();
    let state = state_for(Arc::clone(&site), &config);

    let request = json_request(
        "/api/scrapper/url-data",
        &json!({"urls": [
            "https://example.com/u1",
            "https://example.com/u2",
            "https://example.com/u3"
        ]}),
    );
    let response = routes(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.contains(r#""url":"https://example.com/u1""#));
    drop(body);

    tokio::time::sleep(Duration::from_secs(5)).await;

    // u2 was already rendering and is discarded; u3 is never started
    assert_eq!(site.extraction_count("https://example.com/u2"), 0);
    assert_eq!(site.navigation_count("https://example.com/u3"), 0);
    assert_eq!(site.open_now(), 0);
    assert_eq!(site.opened(), site.closed());
}

#[tokio::test]
async fn test_url_data_with_only_malformed_urls_is_bad_request() {
    let state = test_state();
    let (status, body) = post_json(
        &state,
        "/api/scrapper/url-data",
        json!({"urls": ["not a url", "javascript:x"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing URL");
}
