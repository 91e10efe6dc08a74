//! Trip buffers as Redis lists, one JSON `{latitude, longitude}` element per
//! point.

use std::error::Error;

use async_trait::async_trait;
use ingestion::store::{self, decode_entries, encode_entry, BufferStore, StoreError};
use log::info;
use model::{point::Point, trip::TripKey};
use redis::{aio::MultiplexedConnection, AsyncCommands};

#[derive(Clone)]
pub struct RedisBufferStore {
    connection: MultiplexedConnection,
}

impl RedisBufferStore {
    pub async fn connect(url: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        info!("Connected to Redis at {}.", url);
        Ok(Self { connection })
    }
}

#[async_trait]
impl BufferStore for RedisBufferStore {
    async fn append(&self, key: &TripKey, point: Point) -> store::Result<()> {
        let entry = encode_entry(point)?;
        let mut connection = self.connection.clone();
        let _: () = connection
            .rpush(key.to_string(), entry)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn read_all(&self, key: &TripKey) -> store::Result<Vec<Point>> {
        let mut connection = self.connection.clone();
        let entries: Vec<String> = connection
            .lrange(key.to_string(), 0, -1)
            .await
            .map_err(StoreError::backend)?;
        decode_entries(key, &entries)
    }

    async fn delete(&self, key: &TripKey) -> store::Result<()> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .del(key.to_string())
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

