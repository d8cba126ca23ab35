//! Translation of crawl errors into JSON HTTP responses

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::crawl_engine::CrawlError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Crawl(#[from] CrawlError),
    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Crawl(CrawlError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            Self::Crawl(CrawlError::SessionNotFound) => StatusCode::NOT_FOUND,
            Self::Crawl(CrawlError::SessionBusy) => StatusCode::CONFLICT,
            Self::Crawl(CrawlError::Sitemap(_)) => StatusCode::BAD_GATEWAY,
            Self::Crawl(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {self}");
            "Internal Server Error".to_string()
        } else {
            tracing::debug!("Request rejected ({status}): {self}");
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
