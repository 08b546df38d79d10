//! Password login.
//!
//! Order of checks: rate limit, CSRF, body shape, password. The first failure
//! decides the response, and every message is generic.

use axum::{
    body::Bytes,
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::{state::AuthState, utils::client_ip};
use crate::{
    api::handlers::{error_response, internal_error, ErrorResponse, SuccessResponse},
    auth::{
        cookies::{read_cookie, CSRF_COOKIE_NAME, CSRF_HEADER_NAME},
        now_ms,
    },
    rate_limit::RateLimitOutcome,
};

const RATE_LIMITED_MESSAGE: &str = "Too many login attempts. Please try again later.";
const CSRF_MESSAGE: &str = "Invalid request. Please refresh the page and try again.";
const MISSING_PASSWORD_MESSAGE: &str = "Password is required";
const WRONG_PASSWORD_MESSAGE: &str = "Invalid password";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    params(
        ("X-CSRF-Token" = String, Header, description = "Must equal the csrf-token cookie")
    ),
    responses(
        (status = 200, description = "Logged in, session cookie set", body = SuccessResponse),
        (status = 400, description = "Missing or malformed password", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 403, description = "CSRF validation failed", body = ErrorResponse),
        (status = 429, description = "Too many attempts from this client", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    body: Bytes,
) -> Response {
    let ip = client_ip(&headers);

    let outcome = auth_state.rate_limiter().check(&ip).await;
    if !outcome.allowed {
        warn!(client_ip = %ip, "login rate limited");
        return rate_limited(&outcome);
    }

    let header_token = headers
        .get(CSRF_HEADER_NAME)
        .and_then(|value| value.to_str().ok());
    let cookie_token = read_cookie(&headers, CSRF_COOKIE_NAME);
    if auth_state
        .csrf()
        .validate_submission(header_token, cookie_token.as_deref())
        .is_err()
    {
        warn!(client_ip = %ip, "login rejected: CSRF validation failed");
        return error_response(StatusCode::FORBIDDEN, CSRF_MESSAGE);
    }

    let Some(password) = extract_password(&body) else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_PASSWORD_MESSAGE);
    };

    if !auth_state.config().validate_password(&password) {
        warn!(client_ip = %ip, "login rejected: invalid password");
        return error_response(StatusCode::UNAUTHORIZED, WRONG_PASSWORD_MESSAGE);
    }

    let token = auth_state.sessions().issue();
    let cookie = match auth_state.cookies().session(&token) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return internal_error();
        }
    };

    info!(client_ip = %ip, "login succeeded");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);
    (
        StatusCode::OK,
        response_headers,
        Json(SuccessResponse { success: true }),
    )
        .into_response()
}

/// A non-empty string `password` field, or nothing.
fn extract_password(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("password")? {
        Value::String(password) if !password.is_empty() => Some(password.clone()),
        _ => None,
    }
}

fn rate_limited(outcome: &RateLimitOutcome) -> Response {
    let mut response = error_response(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE);
    let headers = response.headers_mut();
    headers.insert(
        "retry-after",
        HeaderValue::from(outcome.retry_after_seconds(now_ms())),
    );
    headers.insert("x-ratelimit-remaining", HeaderValue::from(outcome.remaining));
    response
}
