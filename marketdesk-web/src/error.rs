//! Server error types

use crate::pages;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use marketdesk_store::StoreError;
use thiserror::Error;

/// Errors a handler can return. Market-source failures never reach here:
/// they become placeholder tables.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::Store(StoreError::DuplicateKey { .. }) => StatusCode::CONFLICT,
            WebError::Store(_) | WebError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(status = status.as_u16(), error = %self, "request failed");

        (status, Html(pages::error_page(status))).into_response()
    }
}
