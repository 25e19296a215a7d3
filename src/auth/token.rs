//! Session token creation and verification.
//!
//! Sessions are HS256-signed JWTs bound to the user's id and email. The
//! client never inspects them; every request re-verifies the signature and
//! expiry server-side.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::error::{AppError, Result};

/// Claims embedded in every session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user's database id
    pub sub: i32,
    pub email: String,
    /// Issued-at (UTC Unix timestamp)
    pub iat: i64,
    /// Expiration (UTC Unix timestamp)
    pub exp: i64,
    /// Unique token id for audit trails
    pub jti: String,
}

/// Sign a session token for a user
pub fn issue_token(user_id: i32, email: &str, settings: &AuthSettings) -> Result<String> {
    let now = Utc::now();
    let exp = now + chrono::Duration::hours(settings.session_ttl_hours);

    let claims = SessionClaims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("sign session token: {e}")))
}

/// Verify a session token, returning its claims.
///
/// Invalid, expired, or malformed tokens yield `Ok(None)`; only server-side
/// faults (key or serialization trouble) surface as errors.
pub fn verify_token(token: &str, settings: &AuthSettings) -> Result<Option<SessionClaims>> {
    let result = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    );

    match result {
        Ok(data) => Ok(Some(data.claims)),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_)
            | jsonwebtoken::errors::ErrorKind::Crypto(_) => {
                Err(AppError::Internal(format!("verify session token: {e}")))
            }
            _ => {
                debug!(error = %e, "Rejected session token");
                Ok(None)
            }
        },
    }
}
