//! Authentication: registration, login, and session resolution.
//!
//! Browser-facing authentication uses an HttpOnly session cookie holding a
//! signed, time-limited token. The token is opaque to the client; every
//! request re-verifies the signature and expiry, then re-fetches the user
//! row so handlers see a live credit balance.

pub mod cookie;
pub mod password;
pub mod token;

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, info};

use crate::config::AuthSettings;
use crate::error::{AppError, Result};
use crate::store::models::User;
use crate::store::CredentialStore;

/// Registration, login, and current-user resolution over a credential store
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    settings: AuthSettings,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, settings: AuthSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Create a new account with the configured starting credit allowance
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = password::hash_password(password)?;
        let user = self
            .store
            .create_user(name, email, &password_hash, self.settings.starting_credits)
            .await?;

        info!(user_id = user.id, "Registered new user");
        Ok(user)
    }

    /// Verify credentials and issue a signed session token
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = token::issue_token(user.id, &user.email, &self.settings)?;
        info!(user_id = user.id, "Login successful");
        Ok((user, token))
    }

    /// Resolve the current user from a request's cookie header.
    ///
    /// Absent, invalid, or expired sessions resolve to `None`; only store
    /// failures are errors. The user row is re-fetched so the returned
    /// credit balance is current rather than the one at login time.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<User>> {
        let Some(token) = cookie::token_from_headers(headers, &self.settings.cookie_name) else {
            return Ok(None);
        };

        let Some(claims) = token::verify_token(&token, &self.settings)? else {
            return Ok(None);
        };

        self.store.find_user_by_id(claims.sub).await
    }

    /// `Set-Cookie` value establishing a session
    pub fn session_cookie(&self, token: &str) -> String {
        cookie::session_cookie(token, &self.settings)
    }

    /// `Set-Cookie` value clearing the session; safe to send repeatedly
    pub fn logout_cookie(&self) -> String {
        cookie::clear_cookie(&self.settings)
    }
}
