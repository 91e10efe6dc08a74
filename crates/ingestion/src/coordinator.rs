//! The per-trip state machine.
//!
//! An `in_route` update appends its point to the trip's buffer. A `finished`
//! update reads the whole buffer, reduces it, stores the reduced route and
//! then deletes the buffer. The point carried by the `finished` update
//! itself is not part of the route.
//!
//! The buffer is only deleted after the route is stored. When reading or
//! storing fails it stays in place, so replaying the `finished` update
//! completes the trip later.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use model::{
    record::TripRecord,
    route::ReducedRoute,
    trip::{Lifecycle, PositionUpdate},
};
use reduction::{compute_stats, reduce, Tolerance};
use tokio::sync::watch;

use crate::{
    metrics::Metrics,
    store::{BufferStore, TripStore},
    tolerance::ToleranceControl,
    IngestionError, IngestionResult, Outcome,
};

#[derive(Clone)]
pub struct Coordinator<B, T> {
    buffer: B,
    trips: T,
    tolerance: watch::Receiver<Tolerance>,
    metrics: Arc<Metrics>,
}

impl<B, T> Coordinator<B, T>
where
    B: BufferStore,
    T: TripStore,
{
    pub fn new(buffer: B, trips: T, tolerance: &ToleranceControl, metrics: Arc<Metrics>) -> Self {
        Self {
            buffer,
            trips,
            tolerance: tolerance.subscribe(),
            metrics,
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Applies one update. Updates for the same trip must not be handled
    /// concurrently; [`crate::dispatcher::Dispatcher`] takes care of that.
    pub async fn handle(&self, update: PositionUpdate) -> IngestionResult<Outcome> {
        self.metrics.message_processed();
        let result = match update.lifecycle {
            Lifecycle::Active => self.buffer_point(update).await,
            Lifecycle::Ended => self.complete(update).await,
        };

        match &result {
            Ok(Outcome::Buffered) => self.metrics.point_buffered(),
            Ok(Outcome::Empty) => self.metrics.route_empty(),
            Ok(Outcome::Completed(route)) => self.metrics.route_completed(&route.stats),
            Err(why) => {
                self.metrics.error();
                if why.is_retryable() {
                    error!("{}. Buffer kept, the trip can be completed again.", why);
                } else {
                    error!("{}", why);
                }
            }
        }
        result
    }

    async fn buffer_point(&self, update: PositionUpdate) -> IngestionResult<Outcome> {
        let PositionUpdate { key, point, .. } = update;
        match self.buffer.append(&key, point).await {
            Ok(()) => {
                debug!("Buffered location {:?} for {}.", point, key);
                Ok(Outcome::Buffered)
            }
            Err(why) => Err(IngestionError::Append { key, source: why }),
        }
    }

    async fn complete(&self, update: PositionUpdate) -> IngestionResult<Outcome> {
        let PositionUpdate { key, timestamp, .. } = update;

        let points = match self.buffer.read_all(&key).await {
            Ok(points) => points,
            Err(why) => return Err(IngestionError::Read { key, source: why }),
        };
        if points.is_empty() {
            info!("Trip {} finished without buffered locations.", key);
            return Ok(Outcome::Empty);
        }

        let tolerance = *self.tolerance.borrow();
        let reduced = reduce(&points, tolerance.value());
        let stats = compute_stats(&points, &reduced);
        info!(
            "Reduced route {} from {} to {} points ({:.2}% reduction, tolerance {}).",
            key, stats.original_points, stats.reduced_points, stats.reduction_percent, tolerance
        );

        let route = ReducedRoute {
            key,
            points: reduced,
            timestamp,
            stats,
        };
        let record = TripRecord::new(&route, Utc::now());
        if let Err(why) = self.trips.insert(&record).await {
            return Err(IngestionError::Persist {
                key: route.key,
                source: why,
            });
        }
        info!("Stored trip {}.", route.key);

        match self.buffer.delete(&route.key).await {
            Ok(()) => debug!("Cleared buffer of {}.", route.key),
            Err(why) => warn!(
                "Trip {} is stored but its buffer could not be cleared: {}",
                route.key, why
            ),
        }
        Ok(Outcome::Completed(route))
    }
}
