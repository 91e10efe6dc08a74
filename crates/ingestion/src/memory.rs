//! In-process stores, used where no external buffer or database is wanted.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use model::{point::Point, record::TripRecord, trip::TripKey};

use crate::store::{BufferStore, Result, TripStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBufferStore {
    lists: Arc<Mutex<HashMap<String, Vec<Point>>>>,
}

impl MemoryBufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffered points of a trip, `None` if it has no buffer.
    pub fn points(&self, key: &TripKey) -> Option<Vec<Point>> {
        lock(&self.lists).get(&key.to_string()).cloned()
    }

    pub fn contains(&self, key: &TripKey) -> bool {
        lock(&self.lists).contains_key(&key.to_string())
    }

    /// Number of buffers.
    pub fn len(&self) -> usize {
        lock(&self.lists).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BufferStore for MemoryBufferStore {
    async fn append(&self, key: &TripKey, point: Point) -> Result<()> {
        lock(&self.lists)
            .entry(key.to_string())
            .or_default()
            .push(point);
        Ok(())
    }

    async fn read_all(&self, key: &TripKey) -> Result<Vec<Point>> {
        Ok(self.points(key).unwrap_or_default())
    }

    async fn delete(&self, key: &TripKey) -> Result<()> {
        lock(&self.lists).remove(&key.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTripStore {
    records: Arc<Mutex<Vec<TripRecord>>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records in insertion order.
    pub fn records(&self) -> Vec<TripRecord> {
        lock(&self.records).clone()
    }

    pub fn record(&self, key: &TripKey) -> Option<TripRecord> {
        lock(&self.records)
            .iter()
            .find(|record| {
                record.driver_id == key.driver_id
                    && record.current_route_id == key.route_id
            })
            .cloned()
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn insert(&self, record: &TripRecord) -> Result<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }
}
