//! Middleware for the dropkey Web API.

pub mod cors;
pub mod rate_limit;

pub use cors::create_cors_layer;
pub use rate_limit::{download_rate_limit, upload_rate_limit, RateLimitState};
