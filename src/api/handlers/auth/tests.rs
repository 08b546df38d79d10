#![allow(clippy::unwrap_used)]

use super::{csrf::csrf, login::login, logout::logout, AuthState};
use crate::{
    auth::AuthConfig,
    rate_limit::{NoopRateLimiter, RateLimiter, SlidingWindowRateLimiter},
};
use axum::{
    body::{to_bytes, Bytes},
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;

const PASSWORD: &str = "correct horse battery staple";

fn state_with(limiter: Arc<dyn RateLimiter>) -> Extension<Arc<AuthState>> {
    let config = AuthConfig::new(
        SecretString::from("test-secret"),
        SecretString::from(PASSWORD),
    )
    .unwrap();
    Extension(Arc::new(AuthState::new(config, limiter).unwrap()))
}

fn state() -> Extension<Arc<AuthState>> {
    state_with(Arc::new(NoopRateLimiter::default()))
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|value| value.to_str().unwrap().to_string())
}

/// Request headers carrying a matching CSRF cookie and header.
fn csrf_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("csrf-token={token}")).unwrap(),
    );
    headers.insert("x-csrf-token", HeaderValue::from_str(token).unwrap());
    headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
    headers
}

fn password_body(password: &str) -> Bytes {
    Bytes::from(serde_json::json!({ "password": password }).to_string())
}

#[tokio::test]
async fn csrf_issues_token_and_cookie() {
    let auth_state = state();
    let response = csrf(HeaderMap::new(), auth_state.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );

    let cookie = set_cookie(&response).unwrap();
    let body = json_body(response).await;
    let token = body["token"].as_str().unwrap();

    assert!(cookie.starts_with(&format!("csrf-token={token};")));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=3600"));
    assert!(auth_state.csrf().verify_signed(token).is_ok());
}

#[tokio::test]
async fn csrf_reuses_existing_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("csrf-token=abc.def"));

    let response = csrf(headers, state()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());
    assert_eq!(json_body(response).await["token"], "abc.def");
}

#[tokio::test]
async fn login_without_csrf_is_forbidden() {
    let response = login(HeaderMap::new(), state(), password_body(PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(set_cookie(&response).is_none());
    assert_eq!(
        json_body(response).await["error"],
        "Invalid request. Please refresh the page and try again."
    );
}

#[tokio::test]
async fn login_with_mismatched_csrf_is_forbidden() {
    let auth_state = state();
    let token = auth_state.csrf().issue().unwrap();
    let mut headers = csrf_headers(&token);
    headers.insert("x-csrf-token", HeaderValue::from_static("other.value"));

    let response = login(headers, auth_state, password_body(PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_with_forged_csrf_is_forbidden() {
    // Header and cookie agree but the signature was never issued by us.
    let forged = format!("{}.{}", "ab".repeat(32), "00".repeat(32));
    let response = login(csrf_headers(&forged), state(), password_body(PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_requires_password() {
    let auth_state = state();
    let token = auth_state.csrf().issue().unwrap();

    for body in ["{}", r#"{"password":""}"#, "not json"] {
        let response = login(csrf_headers(&token), auth_state.clone(), Bytes::from(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Password is required");
    }
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let auth_state = state();
    let token = auth_state.csrf().issue().unwrap();

    let response = login(csrf_headers(&token), auth_state, password_body("nope")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
    assert_eq!(json_body(response).await["error"], "Invalid password");
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let auth_state = state();
    let token = auth_state.csrf().issue().unwrap();

    let response = login(csrf_headers(&token), auth_state.clone(), password_body(PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("auth-token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(cookie.contains("Secure"));

    let session = cookie
        .trim_start_matches("auth-token=")
        .split(';')
        .next()
        .unwrap();
    assert!(auth_state.sessions().is_valid(session));
    assert_eq!(json_body(response).await, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn login_is_rate_limited_before_csrf() {
    let auth_state = state_with(Arc::new(SlidingWindowRateLimiter::new(2, 60_000)));
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.1"));

    for _ in 0..2 {
        let response = login(headers.clone(), auth_state.clone(), password_body(PASSWORD)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = login(headers, auth_state.clone(), password_body(PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get("x-ratelimit-remaining").unwrap(), "0");
    let retry_after: i64 = response
        .headers()
        .get("retry-after")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(
        json_body(response).await["error"],
        "Too many login attempts. Please try again later."
    );

    // Other clients are unaffected.
    let mut other = HeaderMap::new();
    other.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.2"));
    let response = login(other, auth_state, password_body(PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let response = logout(state()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("auth-token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(json_body(response).await, serde_json::json!({ "success": true }));
}
