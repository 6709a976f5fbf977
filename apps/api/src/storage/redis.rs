use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use crate::errors::AppError;
use crate::storage::{Partition, SnapshotStore};

/// Stores each partition as a single Redis string under its partition key.
pub struct RedisSnapshotStore {
    conn: MultiplexedConnection,
}

impl RedisSnapshotStore {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Redis snapshot store connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn load(&self, partition: Partition) -> Result<Option<Vec<u8>>, AppError> {
        let mut conn = self.conn.clone();
        let bytes: Option<Vec<u8>> = conn.get(partition.key()).await?;
        Ok(bytes)
    }

    async fn save(&self, partition: Partition, snapshot: Vec<u8>) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(partition.key(), snapshot).await?;
        Ok(())
    }
}
