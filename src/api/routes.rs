//! Router assembly

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{auth, gallery, generation};
use crate::middleware::rate_limit::RateLimitLayer;
use crate::AppState;

/// Upper bound on any single request, comfortably above the provider
/// timeout so slow generations are not cut off mid-flight.
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    // Mirror the request origin so browser credentials (the session
    // cookie) survive cross-origin development setups.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request());

    let mut generate_routes = Router::new().route("/generate", post(generation::generate));
    if state.settings.rate_limit.enabled {
        generate_routes = generate_routes.layer(RateLimitLayer::new(
            state.settings.rate_limit.requests_per_second,
            state.settings.rate_limit.burst_size,
        ));
    }

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth", post(auth::login).delete(auth::logout))
        .route("/auth/user", get(auth::current_user))
        .route("/images", get(gallery::list_images))
        .merge(generate_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(cors)
        .with_state(state)
}
