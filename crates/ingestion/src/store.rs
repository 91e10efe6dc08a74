use std::{error, fmt, result};

use async_trait::async_trait;
use log::warn;
use model::{
    point::{Location, Point},
    record::TripRecord,
    trip::TripKey,
};

#[derive(Debug)]
pub enum StoreError {
    Serialization(serde_json::Error),
    Backend(Box<dyn error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Backend(Box::new(why))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Serialization(why) => write!(f, "serialization failed: {}", why),
            Self::Backend(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Serialization(why) => Some(why),
            Self::Backend(why) => Some(why.as_ref()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(why: serde_json::Error) -> Self {
        Self::Serialization(why)
    }
}

pub type Result<T> = result::Result<T, StoreError>;

/// Buffer elements are JSON `{latitude, longitude}` objects.
pub fn encode_entry(point: Point) -> Result<String> {
    Ok(serde_json::to_string(&Location::from(point))?)
}

/// Decodes buffer elements in order, skipping elements that are not valid
/// locations. Fails if there are elements but none of them decodes, so a
/// corrupt buffer is never mistaken for an empty one.
pub fn decode_entries(key: &TripKey, entries: &[String]) -> Result<Vec<Point>> {
    let mut points = Vec::with_capacity(entries.len());
    let mut last_error = None;
    for entry in entries {
        match serde_json::from_str::<Location>(entry) {
            Ok(location) => points.push(Point::from(location)),
            Err(why) => {
                warn!("Skipping corrupt buffered location {:?} of {}: {}", entry, key, why);
                last_error = Some(why);
            }
        }
    }
    match last_error {
        Some(why) if points.is_empty() => Err(StoreError::Serialization(why)),
        _ => Ok(points),
    }
}

/// Ordered point lists, one per trip, addressed by the trip key's string form.
#[async_trait]
pub trait BufferStore: Clone + Send + Sync + 'static {
    /// Appends `point` to the end of the trip's list, creating it if needed.
    async fn append(&self, key: &TripKey, point: Point) -> Result<()>;

    /// The whole list in append order; empty if there is none.
    async fn read_all(&self, key: &TripKey) -> Result<Vec<Point>>;

    async fn delete(&self, key: &TripKey) -> Result<()>;
}

/// Durable storage for completed trips.
#[async_trait]
pub trait TripStore: Clone + Send + Sync + 'static {
    async fn insert(&self, record: &TripRecord) -> Result<()>;
}
