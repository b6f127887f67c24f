use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use beacon_db_types::DbResult;
use beacon_primitives::{Checkpoint, Epoch};
use tokio::{fs, io::AsyncWriteExt};
use tracing::*;

use super::{PersistedHandle, StatePersistence};

/// Directory checkpoint states are written to when none is configured.
pub const DEFAULT_CHECKPOINT_STATES_DIR: &str = "checkpoint_states";

/// Persists each state as its own file, named by checkpoint key. The handle is the file path.
#[derive(Debug, Clone)]
pub struct FileStatePersistence {
    dir: PathBuf,
}

impl FileStatePersistence {
    /// Opens the backend, creating `dir` if it doesn't exist yet.
    pub async fn open(dir: impl Into<PathBuf>) -> DbResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, checkpoint: &Checkpoint) -> PathBuf {
        self.dir.join(checkpoint.to_key().as_str())
    }

    fn handle_for(path: &Path) -> PersistedHandle {
        PersistedHandle::new(path.to_string_lossy())
    }
}

#[async_trait]
impl StatePersistence for FileStatePersistence {
    async fn write(&self, checkpoint: Checkpoint, bytes: Vec<u8>) -> DbResult<PersistedHandle> {
        let path = self.path_for(&checkpoint);
        let open = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        match open {
            Ok(mut file) => {
                file.write_all(&bytes).await?;
                file.flush().await?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(%checkpoint, path = %path.display(), "state file already exists");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self::handle_for(&path))
    }

    async fn read(&self, handle: &PersistedHandle) -> DbResult<Option<Vec<u8>>> {
        match fs::read(handle.as_str()).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, handle: &PersistedHandle) -> DbResult<()> {
        match fs::remove_file(handle.as_str()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(%handle, "no state file to remove");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn sweep_before(&self, epoch: Epoch) -> DbResult<Vec<PersistedHandle>> {
        let mut doomed = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(checkpoint) = name.to_str().and_then(|n| n.parse::<Checkpoint>().ok()) else {
                // not one of ours
                continue;
            };
            if checkpoint.epoch() < epoch {
                doomed.push((checkpoint, entry.path()));
            }
        }
        doomed.sort_unstable_by_key(|(cp, _)| *cp);

        let mut removed = Vec::with_capacity(doomed.len());
        for (_, path) in doomed {
            let handle = Self::handle_for(&path);
            self.remove(&handle).await?;
            removed.push(handle);
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use beacon_test_utils::make_checkpoint;

    use super::*;

    #[tokio::test]
    async fn test_open_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join(DEFAULT_CHECKPOINT_STATES_DIR);
        let persistence = FileStatePersistence::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(persistence.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_write_read_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let persistence = FileStatePersistence::open(tmp.path()).await.unwrap();
        let cp = make_checkpoint(12, 3);

        let handle = persistence.write(cp, vec![9; 64]).await.unwrap();
        assert!(handle.as_str().ends_with(cp.to_key().as_str()));
        assert_eq!(persistence.read(&handle).await.unwrap(), Some(vec![9; 64]));

        persistence.remove(&handle).await.unwrap();
        assert_eq!(persistence.read(&handle).await.unwrap(), None);

        // missing file is fine
        persistence.remove(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_if_not_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let persistence = FileStatePersistence::open(tmp.path()).await.unwrap();
        let cp = make_checkpoint(12, 3);

        let first = persistence.write(cp, vec![1]).await.unwrap();
        let second = persistence.write(cp, vec![2]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(persistence.read(&first).await.unwrap(), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_sweep_before() {
        let tmp = tempfile::tempdir().unwrap();
        let persistence = FileStatePersistence::open(tmp.path()).await.unwrap();
        for epoch in [8u64, 9, 10, 11] {
            persistence
                .write(make_checkpoint(epoch, 1), vec![epoch as u8])
                .await
                .expect("test: write");
        }
        std::fs::write(tmp.path().join("README"), b"unrelated").unwrap();

        let swept = persistence.sweep_before(10).await.unwrap();
        assert_eq!(swept.len(), 2);
        assert!(swept[0].as_str().ends_with("_8"));
        assert!(swept[1].as_str().ends_with("_9"));

        let remaining = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(remaining, 3);
    }
}
