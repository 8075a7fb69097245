//! JSON body for oversized requests.
//!
//! `RequestBodyLimitLayer` rejects requests whose `Content-Length` exceeds the limit with
//! a plain-text 413 before any handler runs. This middleware sits outside it and rewrites
//! such responses into the regular error body.

use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use vidvault_core::AppError;

/// Upload limit shown to clients, in megabytes.
#[derive(Debug, Clone, Copy)]
pub struct PayloadLimit {
    pub max_mb: usize,
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

pub async fn payload_too_large_middleware(
    State(limit): State<PayloadLimit>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json(&response) {
        return response;
    }

    HttpAppError(AppError::PayloadTooLarge {
        max_mb: limit.max_mb,
    })
    .into_response()
}
