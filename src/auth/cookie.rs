//! Session cookie carrier: build, clear, and extract.

use axum::http::HeaderMap;

use crate::config::AuthSettings;

/// Build the `Set-Cookie` value for a fresh session
pub fn session_cookie(token: &str, settings: &AuthSettings) -> String {
    let max_age = settings.session_ttl_hours * 3600;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        settings.cookie_name, token, max_age
    );
    if settings.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session; idempotent
pub fn clear_cookie(settings: &AuthSettings) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        settings.cookie_name
    );
    if settings.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session token from a request's `Cookie` header, if present
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            if name == cookie_name && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}
