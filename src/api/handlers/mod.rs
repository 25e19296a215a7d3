//! Request handlers

pub mod auth;
pub mod gallery;
pub mod generation;

use axum::http::{header, HeaderName, HeaderValue};
use axum::response::AppendHeaders;

/// Cache-defeating headers for per-user reads
pub(crate) fn no_store() -> AppendHeaders<[(HeaderName, HeaderValue); 1]> {
    AppendHeaders([(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, must-revalidate"),
    )])
}
