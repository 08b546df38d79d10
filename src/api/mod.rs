use crate::{api::handlers::auth::AuthState, storage::MediaStore};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::{path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, services::ServeDir, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod gate;
pub mod handlers;
mod openapi;

pub use openapi::{openapi, ApiDoc};

use handlers::{auth, error_response, videos};

/// Build the application router.
///
/// Every route, the docs and the fallback sit behind [`gate::gate`]. Unmatched
/// paths are served from `static_dir` when set, otherwise they are 404.
pub fn router(
    auth_state: Arc<AuthState>,
    media: Arc<dyn MediaStore>,
    static_dir: Option<PathBuf>,
) -> Router {
    let media_api = Router::new()
        .route("/api/videos", get(videos::list))
        .route("/api/videos/:key/url", get(videos::url))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            gate::require_session,
        ));

    let docs = Router::new()
        .merge(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi()))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            gate::require_session,
        ));

    let app = Router::new()
        .route("/api/auth/csrf", get(auth::csrf::csrf))
        .route("/api/auth/login", post(auth::login::login))
        .route("/api/auth/logout", post(auth::logout::logout))
        .merge(media_api)
        .merge(docs);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(|| async { error_response(StatusCode::NOT_FOUND, "Not found") }),
    };

    app.layer(middleware::from_fn_with_state(auth_state.clone(), gate::gate))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state))
                .layer(Extension(media)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    auth_state: Arc<AuthState>,
    media: Arc<dyn MediaStore>,
    static_dir: Option<PathBuf>,
) -> Result<()> {
    let app = router(auth_state, media, static_dir);

    let listener = TcpListener::bind(format!("[::]:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
