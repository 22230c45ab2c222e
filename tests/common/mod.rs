//! Test helpers for dropkey integration tests.
//!
//! Builds the real router over a TempDir-backed store and wraps it in an
//! axum-test `TestServer`.

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use dropkey::config::RateLimitConfig;
use dropkey::store::FileStore;
use dropkey::web::handlers::AppState;
use dropkey::web::middleware::RateLimitState;
use dropkey::web::router::{create_docs_router, create_health_router, create_router};

/// A test server together with the storage directory backing it.
pub struct TestContext {
    pub server: TestServer,
    pub store: FileStore,
    /// Owns the storage directory for the duration of the test.
    pub storage_dir: TempDir,
}

/// Rate limits high enough to never interfere with functional tests.
pub fn generous_limits() -> RateLimitConfig {
    RateLimitConfig {
        window_secs: 300,
        upload_limit: 1000,
        download_limit: 1000,
    }
}

/// Create a test server with generous rate limits.
pub fn create_test_server() -> TestContext {
    create_test_server_with(generous_limits(), None)
}

/// Create a test server with custom rate limits.
pub fn create_test_server_with_limits(limits: RateLimitConfig) -> TestContext {
    create_test_server_with(limits, None)
}

/// Create a test server with a custom per-file upload size limit.
pub fn create_test_server_with_max_upload(max_upload_size: u64) -> TestContext {
    create_test_server_with(generous_limits(), Some(max_upload_size))
}

fn create_test_server_with(limits: RateLimitConfig, max_upload_size: Option<u64>) -> TestContext {
    let storage_dir = TempDir::new().expect("Failed to create temp storage dir");
    let store = FileStore::new(storage_dir.path());

    let mut app_state = AppState::new(store.clone());
    if let Some(max) = max_upload_size {
        app_state = app_state.with_max_upload_size(max);
    }

    let rate_limit = Arc::new(RateLimitState::new(&limits));

    let router = create_router(Arc::new(app_state), rate_limit, &[])
        .merge(create_health_router())
        .merge(create_docs_router());

    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        store,
        storage_dir,
    }
}

/// Build a multipart form carrying the given files under the "files" field.
pub fn upload_form(files: &[(&str, &[u8])]) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (filename, content) in files {
        form = form.add_part(
            "files",
            Part::bytes(content.to_vec())
                .file_name(filename.to_string())
                .mime_type("application/octet-stream"),
        );
    }
    form
}
