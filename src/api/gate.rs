//! Request gate: every path is protected unless it is on the public list.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::handlers::{auth::AuthState, error_response};
use crate::auth::cookies::{read_cookie, SESSION_COOKIE_NAME};

pub const LOGIN_PATH: &str = "/login";

const PUBLIC_PREFIXES: [&str; 5] = [
    "/login",
    "/api/auth/login",
    "/api/auth/csrf",
    "/_next",
    "/favicon.ico",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Decide whether `path` needs a session.
///
/// Any path containing a `.` counts as a static asset.
#[must_use]
pub fn classify(path: &str) -> Access {
    if path.contains('.') || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        Access::Public
    } else {
        Access::Protected
    }
}

/// Whether the request carries a session cookie that verifies right now.
#[must_use]
pub fn has_valid_session(auth_state: &AuthState, headers: &HeaderMap) -> bool {
    read_cookie(headers, SESSION_COOKIE_NAME)
        .is_some_and(|token| auth_state.sessions().is_valid(&token))
}

pub async fn gate(
    State(auth_state): State<Arc<AuthState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if classify(request.uri().path()) == Access::Public
        || has_valid_session(&auth_state, request.headers())
    {
        return next.run(request).await;
    }

    debug!(path = request.uri().path(), "no valid session, redirecting");
    Redirect::temporary(LOGIN_PATH).into_response()
}

/// Route-level check for the media API and the API docs.
///
/// Encoded object keys and the docs assets (`/docs/openapi.json`,
/// `/docs/swagger-ui.css`) contain a `.`, which [`classify`] treats as a static
/// asset, so the gate alone would let them through.
pub async fn require_session(
    State(auth_state): State<Arc<AuthState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if has_valid_session(&auth_state, request.headers()) {
        return next.run(request).await;
    }
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
}
