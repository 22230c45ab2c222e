//! Periodic eviction sweeper.

use std::time::{Duration, SystemTime};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::storage::FileStore;

/// Scheduler for the periodic expiry sweep.
///
/// Holds the cancellable task handle; started at process init, stopped at
/// shutdown (also on drop). Sweeps run to completion inside the interval
/// loop, so two sweeps can never overlap; ticks missed during a slow sweep
/// are skipped rather than replayed.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Start the sweep loop.
    ///
    /// Every `interval`, files older than `age_limit` are deleted from the
    /// store. The first tick fires one full interval after start.
    pub fn start(store: FileStore, interval: Duration, age_limit: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Sweeper shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let stats = store.sweep_expired(SystemTime::now(), age_limit);
                        if stats.deleted > 0 || stats.failed > 0 {
                            tracing::info!(
                                examined = stats.examined,
                                deleted = stats.deleted,
                                failed = stats.failed,
                                "Sweep completed"
                            );
                        } else {
                            tracing::debug!(examined = stats.examined, "Sweep found nothing to delete");
                        }
                    }
                }
            }
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the sweep loop.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sweeper_deletes_expired_files_on_tick() {
        let temp_dir = TempDir::new().unwrap();
        let entry = temp_dir
            .path()
            .join("aaaaaaaaaaaaaaaa_bbbbbbbbbbbbbbbb_x.txt");
        fs::write(&entry, b"data").unwrap();

        // Back-date the entry past the age limit.
        fs::File::options()
            .write(true)
            .open(&entry)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(7200))
            .unwrap();

        let store = FileStore::new(temp_dir.path());
        let mut sweeper = Sweeper::start(
            store,
            Duration::from_millis(20),
            Duration::from_secs(3600),
        );

        // Wait out the first tick.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while entry.exists() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(!entry.exists());
        sweeper.stop();
    }

    #[tokio::test]
    async fn test_sweeper_stop_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let mut sweeper = Sweeper::start(
            store,
            Duration::from_secs(300),
            Duration::from_secs(3600),
        );

        sweeper.stop();
        sweeper.stop();
    }
}
