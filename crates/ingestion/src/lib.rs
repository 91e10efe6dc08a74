use std::{error::Error, fmt};

use actors::actor::ActorError;
use model::{route::ReducedRoute, trip::TripKey};
use store::StoreError;

pub mod coordinator;
pub mod dispatcher;
pub mod memory;
pub mod metrics;
pub mod store;
pub mod tolerance;

/// What handling one position update did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The point was appended to its trip's buffer.
    Buffered,
    /// The trip ended without any buffered point; nothing was reduced.
    Empty,
    /// The trip ended and its reduced route was stored.
    Completed(ReducedRoute),
}

#[derive(Debug)]
pub enum IngestionError {
    /// The point could not be buffered and is lost.
    Append { key: TripKey, source: StoreError },
    /// The buffer could not be read; it is left in place.
    Read { key: TripKey, source: StoreError },
    /// The reduced route could not be stored; the buffer is left in place.
    Persist { key: TripKey, source: StoreError },
    /// The trip's worker stopped or dropped the update.
    WorkerUnavailable { key: TripKey, source: ActorError },
}

impl IngestionError {
    pub fn key(&self) -> &TripKey {
        match self {
            Self::Append { key, .. }
            | Self::Read { key, .. }
            | Self::Persist { key, .. }
            | Self::WorkerUnavailable { key, .. } => key,
        }
    }

    /// Whether replaying the `finished` update can still complete the trip.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Persist { .. })
    }
}

impl fmt::Display for IngestionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Append { key, source } => {
                write!(f, "could not buffer location for {}: {}", key, source)
            }
            Self::Read { key, source } => {
                write!(f, "could not read buffered route {}: {}", key, source)
            }
            Self::Persist { key, source } => {
                write!(f, "could not store trip {}: {}", key, source)
            }
            Self::WorkerUnavailable { key, source } => {
                write!(f, "worker for trip {} unavailable: {}", key, source)
            }
        }
    }
}

impl Error for IngestionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Append { source, .. }
            | Self::Read { source, .. }
            | Self::Persist { source, .. } => Some(source),
            Self::WorkerUnavailable { source, .. } => Some(source),
        }
    }
}

pub type IngestionResult<O> = Result<O, IngestionError>;

#[cfg(test)]
mod testing;
