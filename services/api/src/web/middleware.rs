//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, plus the
//! anonymous-tolerant cookie resolution used by public pages.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

/// Extracts the auth session id from a Cookie header value.
pub fn session_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("session=")
    })
}

/// Middleware that validates the auth session cookie and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let auth_session_id = session_cookie(cookie_header).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .repo
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}

/// Caller resolution for public pages: a missing, malformed, or expired
/// cookie resolves to anonymous. Never errors.
pub async fn optional_user_id(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let auth_session_id = session_cookie(cookie_header)?;
    state.repo.validate_auth_session(auth_session_id).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_among_other_cookies() {
        assert_eq!(
            session_cookie("theme=dark; session=abc123; lang=en"),
            Some("abc123")
        );
        assert_eq!(session_cookie("session=xyz"), Some("xyz"));
    }

    #[test]
    fn missing_session_is_none() {
        assert_eq!(session_cookie("theme=dark; lang=en"), None);
        assert_eq!(session_cookie(""), None);
    }
}
