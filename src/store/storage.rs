//! Key-scoped file store.
//!
//! A single flat directory holds all live files; the directory listing is
//! the only index. Each entry's filename carries both capability keys (see
//! [`super::name`]), so lookups are substring matches over the listing
//! rather than a keyed map. O(n) per request is a deliberate tradeoff for
//! the small expected working set.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::{DropkeyError, Result};

use super::keys::FileKeys;
use super::name;

/// Counters reported by one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Entries examined.
    pub examined: usize,
    /// Entries deleted (including entries already gone when unlinked).
    pub deleted: usize,
    /// Entries that could not be examined or deleted.
    pub failed: usize,
}

/// File store over the flat storage directory.
///
/// The directory itself is created on demand at the first save; lookups
/// against a directory that cannot be listed classify as storage errors.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Storage directory holding all live files.
    dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at the given directory.
    ///
    /// No filesystem access happens here; the directory is created lazily
    /// by [`FileStore::save`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save uploaded content under the encoded physical name.
    ///
    /// Returns the physical filename the content was stored under.
    pub fn save(&self, keys: &FileKeys, original_name: &str, content: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir)?;

        let physical = name::encode(keys, original_name);
        fs::write(self.dir.join(&physical), content)?;

        Ok(physical)
    }

    /// Read the content of a stored file by its physical name.
    pub fn read(&self, physical: &str) -> Result<Vec<u8>> {
        match fs::read(self.dir.join(physical)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DropkeyError::NotFound(
                "File not found or has been removed.".to_string(),
            )),
            Err(e) => {
                tracing::error!(physical = %physical, error = %e, "Failed to read stored file");
                Err(DropkeyError::Storage(
                    "Could not download the file.".to_string(),
                ))
            }
        }
    }

    /// Resolve a public key to the physical name of the stored file.
    ///
    /// The first entry matching the key prefix in directory-listing order
    /// wins; key collisions are out of model. Errors already classified by
    /// a callee propagate unchanged.
    pub fn find_by_public_key(&self, public_key: &str) -> Result<String> {
        if public_key.is_empty() {
            return Err(DropkeyError::InvalidKey(
                "Public key is required".to_string(),
            ));
        }

        let entries = self.list_entries().map_err(|e| {
            tracing::error!(dir = %self.dir.display(), error = %e, "Failed to list storage directory");
            DropkeyError::Storage("Server error while accessing files".to_string())
        })?;

        entries
            .into_iter()
            .find(|entry| name::matches_public_key(entry, public_key))
            .ok_or_else(|| DropkeyError::NotFound("File not found".to_string()))
    }

    /// Delete the stored file matching a private key.
    ///
    /// Losing the find-then-unlink race against a concurrent delete or the
    /// sweep counts as satisfied deletion. Errors already classified by a
    /// callee propagate unchanged.
    pub fn delete_by_private_key(&self, private_key: &str) -> Result<()> {
        if private_key.is_empty() {
            return Err(DropkeyError::InvalidKey(
                "Private key is required".to_string(),
            ));
        }

        let entries = self.list_entries().map_err(|e| {
            tracing::error!(dir = %self.dir.display(), error = %e, "Failed to list storage directory");
            DropkeyError::DeleteFailed("Failed to delete file".to_string())
        })?;

        let physical = entries
            .into_iter()
            .find(|entry| name::matches_private_key(entry, private_key))
            .ok_or_else(|| {
                DropkeyError::NotFound("File not found or private key is invalid".to_string())
            })?;

        match fs::remove_file(self.dir.join(&physical)) {
            Ok(()) => Ok(()),
            // Already removed by a racing delete or the sweep.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!(physical = %physical, error = %e, "Failed to unlink stored file");
                Err(DropkeyError::DeleteFailed(
                    "Failed to delete file".to_string(),
                ))
            }
        }
    }

    /// Whether any live file is reachable through the given public key.
    ///
    /// Used by the upload path to retry key generation on a collision; a
    /// listing failure reads as "not taken" since no uniqueness guarantee
    /// exists anyway.
    pub fn has_public_key(&self, public_key: &str) -> bool {
        if public_key.is_empty() {
            return false;
        }
        self.list_entries()
            .map(|entries| {
                entries
                    .iter()
                    .any(|entry| name::matches_public_key(entry, public_key))
            })
            .unwrap_or(false)
    }

    /// Delete every stored file older than `age_limit` as of `now`.
    ///
    /// A missing storage directory is a no-op. Per-file failures are
    /// logged and counted, never aborting the sweep over the remaining
    /// entries.
    pub fn sweep_expired(&self, now: SystemTime, age_limit: Duration) -> SweepStats {
        let mut stats = SweepStats::default();

        if !self.dir.exists() {
            return stats;
        }

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Sweep could not list storage directory");
                return stats;
            }
        };

        for entry in entries.flatten() {
            stats.examined += 1;
            let path = entry.path();

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(path = %path.display(), error = %e, "Sweep could not stat entry");
                    continue;
                }
            };

            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age <= age_limit {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    stats.deleted += 1;
                    tracing::info!(path = %path.display(), age_secs = age.as_secs(), "Deleted expired file");
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // Removed under us by a racing delete; already satisfied.
                    stats.deleted += 1;
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete expired file");
                }
            }
        }

        stats
    }

    /// List the storage directory's filenames.
    fn list_entries(&self) -> io::Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(entries)
    }
}
