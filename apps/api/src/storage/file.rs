use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::storage::{Partition, SnapshotStore};

/// Writes each partition to `<dir>/<partition key>.json`.
///
/// Saves go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write never leaves a truncated snapshot behind.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "File snapshot store ready");
        Ok(Self { dir })
    }

    fn path_for(&self, partition: Partition) -> PathBuf {
        self.dir.join(format!("{}.json", partition.key()))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, partition: Partition) -> Result<Option<Vec<u8>>, AppError> {
        match tokio::fs::read(self.path_for(partition)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, partition: Partition, snapshot: Vec<u8>) -> Result<(), AppError> {
        let path = self.path_for(partition);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &snapshot).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
