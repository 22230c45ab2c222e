//! Capability key generation.

use rand::Rng;

/// The pair of capability keys bound to one stored file.
///
/// The public key permits download, the private key permits deletion.
/// Both are independently sampled; neither is derivable from the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKeys {
    /// Download capability.
    pub public_key: String,
    /// Deletion capability.
    pub private_key: String,
}

impl FileKeys {
    /// Generate a fresh key pair.
    ///
    /// Each key is 8 random bytes hex-encoded (16 characters), drawn from
    /// the thread-local CSPRNG. No registry of issued keys exists; the
    /// collision probability at 64 bits of entropy per key is accepted.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self {
            public_key: hex::encode(rng.random::<[u8; 8]>()),
            private_key: hex::encode(rng.random::<[u8; 8]>()),
        }
    }

    /// Construct a key pair from existing key strings.
    ///
    /// Used by tests and by callers that re-derive keys from a decoded
    /// physical filename.
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }
}
