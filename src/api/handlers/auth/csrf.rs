//! CSRF token endpoint.

use axum::{
    extract::Extension,
    http::{
        header::{CACHE_CONTROL, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::state::AuthState;
use crate::{
    api::handlers::{error_response, ErrorResponse},
    auth::{
        cookies::{read_cookie, CSRF_COOKIE_NAME},
        csrf::CsrfIssue,
    },
};

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CsrfResponse {
    pub token: String,
}

#[utoipa::path(
    get,
    path = "/api/auth/csrf",
    responses(
        (status = 200, description = "Current or newly issued CSRF token", body = CsrfResponse),
        (status = 500, description = "Token could not be generated", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn csrf(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let cookie = read_cookie(&headers, CSRF_COOKIE_NAME);

    let issue = match auth_state.csrf().current_or_new(cookie.as_deref()) {
        Ok(issue) => issue,
        Err(err) => {
            error!("Failed to generate CSRF token: {err}");
            return failed();
        }
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if let CsrfIssue::Fresh(token) = &issue {
        debug!("issued new CSRF token");
        match auth_state.cookies().csrf(token) {
            Ok(cookie) => {
                response_headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => {
                error!("Failed to build CSRF cookie: {err}");
                return failed();
            }
        }
    }

    let body = CsrfResponse {
        token: issue.token().to_string(),
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}

fn failed() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to generate CSRF token",
    )
}
