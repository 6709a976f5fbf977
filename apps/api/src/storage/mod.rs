//! Snapshot persistence. Each store is written whole to a named partition
//! after every mutation and rehydrated at startup.
//!
//! `AppState` carries the backend as `Arc<dyn SnapshotStore>`; the file
//! backend is the default and Redis is swapped in when `REDIS_URL` is set.

pub mod file;
pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, error, info};

use crate::errors::AppError;

pub use self::file::FileSnapshotStore;
pub use self::memory::MemorySnapshotStore;
#[cfg(test)]
pub use self::memory::FlakySnapshotStore;
pub use self::redis::RedisSnapshotStore;

/// Named storage partitions, one per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Jobs,
    Resumes,
    Candidates,
}

impl Partition {
    pub fn key(self) -> &'static str {
        match self {
            Partition::Jobs => "jobs-storage",
            Partition::Resumes => "resumes-storage",
            Partition::Candidates => "candidates-storage",
        }
    }
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the last saved snapshot, or `None` if the partition was never written.
    async fn load(&self, partition: Partition) -> Result<Option<Vec<u8>>, AppError>;

    async fn save(&self, partition: Partition, snapshot: Vec<u8>) -> Result<(), AppError>;
}

/// A store guarded by an async lock whose every write is followed by a snapshot save.
pub struct Persisted<T> {
    inner: RwLock<T>,
    partition: Partition,
    backend: Arc<dyn SnapshotStore>,
}

impl<T> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Rehydrates from the backend, falling back to `seed` when nothing was saved yet.
    pub async fn load_or(
        partition: Partition,
        backend: Arc<dyn SnapshotStore>,
        seed: impl FnOnce() -> T,
    ) -> Result<Self, AppError> {
        let value = match backend.load(partition).await? {
            Some(bytes) => {
                info!(partition = partition.key(), bytes = bytes.len(), "Rehydrated snapshot");
                serde_json::from_slice(&bytes)?
            }
            None => {
                info!(partition = partition.key(), "No snapshot found, seeding");
                seed()
            }
        };
        Ok(Self::new(value, partition, backend))
    }

    pub fn new(value: T, partition: Partition, backend: Arc<dyn SnapshotStore>) -> Self {
        Self {
            inner: RwLock::new(value),
            partition,
            backend,
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().await
    }

    /// Applies `f` under the write lock, then saves the full snapshot before releasing it.
    ///
    /// When the save fails the previous value is restored and the error is
    /// returned, so memory never holds a change the caller was told failed.
    pub async fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, AppError> {
        let mut guard = self.inner.write().await;
        let before = T::clone(&guard);
        let result = f(&mut guard);
        if let Err(e) = self.save(&guard).await {
            *guard = before;
            return Err(e);
        }
        Ok(result)
    }

    /// Applies `f` and keeps the change even when the save fails. The failure
    /// is logged; the next successful save writes the whole store again.
    ///
    /// Used by background transitions that nobody could retry, such as
    /// resolving a `processing` résumé.
    pub async fn write_best_effort<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write().await;
        let result = f(&mut guard);
        if let Err(e) = self.save(&guard).await {
            error!(
                partition = self.partition.key(),
                error = %e,
                "Snapshot save failed, change kept in memory"
            );
        }
        result
    }

    async fn save(&self, value: &T) -> Result<(), AppError> {
        let snapshot = serde_json::to_vec(value)?;
        debug!(partition = self.partition.key(), bytes = snapshot.len(), "Saving snapshot");
        self.backend.save(self.partition, snapshot).await
    }
}
