//! Handlers for the `/auth` resource (register, login, logout, current user).

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::models::SafeUser;
use crate::AppState;

use super::no_store;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Response for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub credits: i32,
}

/// Request body for `POST /auth`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for `POST /auth`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// Response for `DELETE /auth`.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Response for `GET /auth/user`.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: Option<SafeUser>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create an account with the starting credit allowance.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let user = state
        .authenticator
        .register(&input.name, &input.email, &input.password)
        .await?;

    Ok(Json(RegisterResponse {
        user: RegisteredUser {
            id: user.id,
            email: user.email,
            name: user.name,
            credits: user.credits,
        },
    }))
}

/// POST /auth
///
/// Verify credentials and establish a session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = state.authenticator.login(&input.email, &input.password).await?;
    let cookie = state.authenticator.session_cookie(&token);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            user: LoginUser {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        }),
    ))
}

/// DELETE /auth
///
/// Clear the session cookie. Succeeds whether or not a session existed.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, state.authenticator.logout_cookie())]),
        Json(LogoutResponse { success: true }),
    )
}

/// GET /auth/user
///
/// Resolve the current session to a client-safe user view, or `null` when
/// no valid session is present.
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let user = state.authenticator.current_user(&headers).await?;

    Ok((
        no_store(),
        Json(CurrentUserResponse {
            user: user.map(|u| u.safe()),
        }),
    ))
}
