//! Stores with injectable failures, corruption and delays.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use async_trait::async_trait;
use model::{point::Point, record::TripRecord, trip::TripKey};
use tokio::sync::Notify;

use crate::{
    memory::{MemoryBufferStore, MemoryTripStore},
    store::{decode_entries, encode_entry, BufferStore, Result, StoreError, TripStore},
};

#[derive(Debug)]
pub struct Unavailable;

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("store unavailable")
    }
}

impl std::error::Error for Unavailable {}

fn check(flag: &AtomicBool) -> Result<()> {
    if flag.load(Ordering::SeqCst) {
        Err(StoreError::backend(Unavailable))
    } else {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FlakyBufferStore {
    pub inner: MemoryBufferStore,
    append: Arc<AtomicBool>,
    read: Arc<AtomicBool>,
    delete: Arc<AtomicBool>,
}

impl FlakyBufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_append(&self, fail: bool) {
        self.append.store(fail, Ordering::SeqCst);
    }

    pub fn fail_read(&self, fail: bool) {
        self.read.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BufferStore for FlakyBufferStore {
    async fn append(&self, key: &TripKey, point: Point) -> Result<()> {
        check(&self.append)?;
        self.inner.append(key, point).await
    }

    async fn read_all(&self, key: &TripKey) -> Result<Vec<Point>> {
        check(&self.read)?;
        self.inner.read_all(key).await
    }

    async fn delete(&self, key: &TripKey) -> Result<()> {
        check(&self.delete)?;
        self.inner.delete(key).await
    }
}

#[derive(Clone, Default)]
pub struct FlakyTripStore {
    pub inner: MemoryTripStore,
    insert: Arc<AtomicBool>,
}

impl FlakyTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.insert.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TripStore for FlakyTripStore {
    async fn insert(&self, record: &TripRecord) -> Result<()> {
        check(&self.insert)?;
        self.inner.insert(record).await
    }
}

/// A buffer whose appends take a while, so that later updates for the same
/// trip would overtake them if they were not serialized.
#[derive(Clone, Default)]
pub struct SlowBufferStore {
    pub inner: MemoryBufferStore,
}

#[async_trait]
impl BufferStore for SlowBufferStore {
    async fn append(&self, key: &TripKey, point: Point) -> Result<()> {
        // vary the delay so unserialized appends would reorder
        let micros = (point.x.abs() as u64 * 37) % 500;
        tokio::time::sleep(Duration::from_micros(micros)).await;
        self.inner.append(key, point).await
    }

    async fn read_all(&self, key: &TripKey) -> Result<Vec<Point>> {
        tokio::task::yield_now().await;
        self.inner.read_all(key).await
    }

    async fn delete(&self, key: &TripKey) -> Result<()> {
        self.inner.delete(key).await
    }
}

/// A buffer of encoded elements, as an external store keeps them. Elements
/// can be written directly to simulate corruption.
#[derive(Clone, Default)]
pub struct EncodedBufferStore {
    lists: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl EncodedBufferStore {
    pub fn push_raw(&self, key: &TripKey, entry: &str) {
        self.lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .push(entry.to_string());
    }

    pub fn contains(&self, key: &TripKey) -> bool {
        self.lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key.to_string())
    }
}

#[async_trait]
impl BufferStore for EncodedBufferStore {
    async fn append(&self, key: &TripKey, point: Point) -> Result<()> {
        let entry = encode_entry(point)?;
        self.push_raw(key, &entry);
        Ok(())
    }

    async fn read_all(&self, key: &TripKey) -> Result<Vec<Point>> {
        let entries = self
            .lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key.to_string())
            .cloned()
            .unwrap_or_default();
        decode_entries(key, &entries)
    }

    async fn delete(&self, key: &TripKey) -> Result<()> {
        self.lists
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key.to_string());
        Ok(())
    }
}

/// A trip store whose inserts wait until released.
#[derive(Clone, Default)]
pub struct GatedTripStore {
    pub inner: MemoryTripStore,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl TripStore for GatedTripStore {
    async fn insert(&self, record: &TripRecord) -> Result<()> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.insert(record).await
    }
}
