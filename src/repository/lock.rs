use crate::repository::RepositoryError;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A lock file left behind for this long is assumed to belong to a dead process
const STALE_AFTER: Duration = Duration::from_secs(60);

/// Exclusive lock on a snapshot file, held as `<file>.lock`.
///
/// The lock file is created with `create_new`, so only one holder exists
/// across processes. Dropping the guard removes it.
pub struct SnapshotLock {
    path: PathBuf,
}

impl SnapshotLock {
    pub fn path_for(data_file: &Path) -> PathBuf {
        let mut name = data_file.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Wait up to `timeout` for the lock on `data_file`
    pub async fn acquire(data_file: &Path, timeout: Duration) -> Result<Self, RepositoryError> {
        let path = Self::path_for(data_file);
        let deadline = Instant::now() + timeout;

        loop {
            let created = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match created {
                Ok(mut file) => {
                    // Holder pid, for whoever finds a stale lock
                    let _ = file
                        .write_all(std::process::id().to_string().as_bytes())
                        .await;
                    debug!("Acquired {}", path.display());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if is_stale(&path).await {
                        warn!("Removing stale lock {}", path.display());
                        let _ = tokio::fs::remove_file(&path).await;
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(RepositoryError::LockTimeout(path));
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(source) => return Err(RepositoryError::Io { path, source }),
            }
        }
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release {}: {}", self.path.display(), e);
        }
    }
}

async fn is_stale(path: &Path) -> bool {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return false;
    };
    metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > STALE_AFTER)
}
