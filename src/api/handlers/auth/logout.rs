use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::state::AuthState;
use crate::api::handlers::SuccessResponse;

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = SuccessResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> Response {
    // Tokens are stateless; dropping the cookie is all a logout can do.
    let mut response_headers = HeaderMap::new();
    match auth_state.cookies().clear_session() {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    (
        StatusCode::OK,
        response_headers,
        Json(SuccessResponse { success: true }),
    )
        .into_response()
}
