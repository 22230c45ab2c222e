//! dropkey - Anonymous file sharing with capability keys
//!
//! Clients upload files and receive a public key (for download) and a
//! private key (for deletion) per file. Files live in a single flat
//! storage directory whose listing is the only index; a background sweeper
//! evicts files older than the retention window.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod web;

pub use config::Config;
pub use error::{DropkeyError, Result};
pub use store::{FileKeys, FileStore, SweepStats, Sweeper};
pub use web::{ApiError, WebServer};
