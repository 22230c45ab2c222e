//! API handlers for the dropkey Web API.

pub mod files;

pub use files::{delete_file, download_file, upload_files};

use crate::store::FileStore;

/// Default maximum upload size per file (10MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Shared application state for handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The file store.
    pub store: FileStore,
    /// Maximum upload size per file in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set the maximum upload size per file.
    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }
}
