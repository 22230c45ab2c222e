//! Key-scoped file storage for dropkey.
//!
//! This module provides the file lifecycle core:
//! - Capability key generation (public/private pair per file)
//! - Physical filename encoding carrying both keys
//! - Flat-directory store with key-based lookup and deletion
//! - Periodic expiry sweep

pub mod keys;
pub mod name;

mod storage;
mod sweep;

pub use keys::FileKeys;
pub use storage::{FileStore, SweepStats};
pub use sweep::Sweeper;

/// Length of each capability key in characters (8 random bytes, hex).
pub const KEY_LENGTH: usize = 16;

/// Attempts at minting an unused public key before accepting a collision.
pub const KEY_GENERATION_ATTEMPTS: usize = 3;

/// Mint a key pair whose public key does not collide with a live file.
///
/// Collisions are astronomically unlikely at 64 bits of entropy, so once
/// the attempts run out the last pair is used as-is rather than failing
/// the upload.
pub fn mint_keys(store: &FileStore) -> FileKeys {
    let mut keys = FileKeys::generate();
    for _ in 1..KEY_GENERATION_ATTEMPTS {
        if !store.has_public_key(&keys.public_key) {
            break;
        }
        tracing::warn!(public_key = %keys.public_key, "Public key collision, regenerating");
        keys = FileKeys::generate();
    }
    keys
}
