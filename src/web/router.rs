//! Router configuration for the dropkey Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::dto::{MessageResponse, MultiUploadResponse, SingleUploadResponse, UploadedFileInfo};
use super::handlers::{delete_file, download_file, upload_files, AppState};
use super::middleware::{
    create_cors_layer, download_rate_limit, upload_rate_limit, RateLimitState,
};

/// OpenAPI documentation for the file endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::handlers::files::upload_files,
        crate::web::handlers::files::download_file,
        crate::web::handlers::files::delete_file
    ),
    components(schemas(
        UploadedFileInfo,
        SingleUploadResponse,
        MultiUploadResponse,
        MessageResponse
    )),
    tags(
        (name = "files", description = "Anonymous key-scoped file sharing")
    )
)]
struct ApiDoc;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    // A request may carry several files; leave room beyond the per-file
    // limit for additional files and multipart framing.
    let body_limit = (app_state.max_upload_size as usize).saturating_mul(4);

    let rate_limit_for_upload = rate_limit.clone();
    let upload_routes = Router::new()
        .route("/files", post(upload_files))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_for_upload.clone();
            upload_rate_limit(state, req, next)
        }))
        .layer(DefaultBodyLimit::max(body_limit));

    // Download and delete share one path, distinguished by method; the
    // rate limit middleware only throttles GET.
    let rate_limit_for_download = rate_limit.clone();
    let key_routes = Router::new()
        .route("/files/:key", get(download_file).delete(delete_file))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_for_download.clone();
            download_rate_limit(state, req, next)
        }));

    let api_routes = Router::new().merge(upload_routes).merge(key_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create a router serving the OpenAPI document.
pub fn create_docs_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// OpenAPI document handler.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
