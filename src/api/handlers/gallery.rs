//! Handler for `GET /images`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::store::models::GalleryImage;
use crate::AppState;

use super::no_store;

/// Maximum number of gallery rows returned per request.
const GALLERY_LIMIT: i64 = 20;

/// Response for `GET /images`.
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<GalleryImage>,
}

/// GET /images
///
/// The session user's gallery: images joined with their prompt text,
/// newest first, capped at 20 rows.
pub async fn list_images(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let user = state
        .authenticator
        .current_user(&headers)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let images = state.ledger.list_images(user.id, GALLERY_LIMIT).await?;

    Ok((no_store(), Json(ImagesResponse { images })))
}
