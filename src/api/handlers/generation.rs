//! Handler for `POST /generate`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::{AppError, Result};
use crate::generation::CompletedGeneration;
use crate::AppState;

/// POST /generate
///
/// Run one credit-gated generation for the session user. The client waits
/// for the full round trip; the response carries the durable image URL.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CompletedGeneration>> {
    let user = state
        .authenticator
        .current_user(&headers)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // The prompt must be a non-empty JSON string; anything else is a 400.
    let prompt = body
        .get("prompt")
        .and_then(|v| v.as_str())
        .ok_or(AppError::InvalidPrompt)?;

    let completed = state.generation.run(&user, prompt).await?;
    Ok(Json(completed))
}
