use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::storage::{Partition, SnapshotStore};

/// Keeps snapshots in process memory. Used by tests and throwaway runs.
#[derive(Default)]
pub struct MemorySnapshotStore {
    partitions: Mutex<HashMap<Partition, Vec<u8>>>,
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, partition: Partition) -> Result<Option<Vec<u8>>, AppError> {
        let partitions = self
            .partitions
            .lock()
            .map_err(|_| AppError::Persistence("memory store lock poisoned".to_string()))?;
        Ok(partitions.get(&partition).cloned())
    }

    async fn save(&self, partition: Partition, snapshot: Vec<u8>) -> Result<(), AppError> {
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| AppError::Persistence("memory store lock poisoned".to_string()))?;
        partitions.insert(partition, snapshot);
        Ok(())
    }
}

/// Memory backend whose saves can be switched to fail.
#[cfg(test)]
#[derive(Default)]
pub struct FlakySnapshotStore {
    inner: MemorySnapshotStore,
    failing: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl FlakySnapshotStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl SnapshotStore for FlakySnapshotStore {
    async fn load(&self, partition: Partition) -> Result<Option<Vec<u8>>, AppError> {
        self.inner.load(partition).await
    }

    async fn save(&self, partition: Partition, snapshot: Vec<u8>) -> Result<(), AppError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::Persistence("backend unavailable".to_string()));
        }
        self.inner.save(partition, snapshot).await
    }
}
