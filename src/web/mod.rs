//! Web API module for dropkey.
//!
//! This module provides the HTTP surface over the file store: multipart
//! upload, key-based download and deletion, rate limiting, and the
//! OpenAPI document.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
