//! Routes position updates to one worker per trip.
//!
//! Updates for the same trip are handled strictly in the order they were
//! dispatched, while different trips are handled concurrently. A trip's
//! worker is dropped once its `finished` update has been handled and nothing
//! else for that trip is queued.

use std::sync::Arc;

use actors::{
    actor::Actor,
    handler::{Handler, Message},
    registry::Registry,
};
use async_trait::async_trait;
use log::error;
use model::trip::{Lifecycle, PositionUpdate, TripKey};
use tokio::task::JoinHandle;

use crate::{
    coordinator::Coordinator,
    metrics::Metrics,
    store::{BufferStore, TripStore},
    IngestionError, IngestionResult, Outcome,
};

pub struct TripWorker<B, T> {
    coordinator: Coordinator<B, T>,
}

impl<B, T> Actor for TripWorker<B, T>
where
    B: BufferStore,
    T: TripStore,
{
}

pub struct HandleUpdate(pub PositionUpdate);

impl Message for HandleUpdate {
    type Response = IngestionResult<Outcome>;
}

#[async_trait]
impl<B, T> Handler<HandleUpdate> for TripWorker<B, T>
where
    B: BufferStore,
    T: TripStore,
{
    async fn handle(&mut self, message: HandleUpdate) -> IngestionResult<Outcome> {
        self.coordinator.handle(message.0).await
    }
}

pub struct Dispatcher<B, T>
where
    B: BufferStore,
    T: TripStore,
{
    workers: Registry<TripKey, TripWorker<B, T>>,
    metrics: Arc<Metrics>,
}

impl<B, T> Clone for Dispatcher<B, T>
where
    B: BufferStore,
    T: TripStore,
{
    fn clone(&self) -> Self {
        Self {
            workers: self.workers.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<B, T> Dispatcher<B, T>
where
    B: BufferStore,
    T: TripStore,
{
    pub fn new(coordinator: Coordinator<B, T>) -> Self {
        let metrics = coordinator.metrics();
        let workers = Registry::new(move |_: &TripKey| TripWorker {
            coordinator: coordinator.clone(),
        });
        Self { workers, metrics }
    }

    /// Queues `update` with its trip's worker before returning. The returned
    /// handle resolves once the update has been handled; dropping it does
    /// not cancel anything.
    pub fn dispatch(&self, update: PositionUpdate) -> JoinHandle<IngestionResult<Outcome>> {
        let key = update.key.clone();
        let lifecycle = update.lifecycle;
        let request = self.workers.ask(&key, HandleUpdate(update));
        self.metrics.set_active_trips(self.workers.len());

        let workers = self.workers.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let result = match request {
                Ok(request) => request
                    .complete(|_| lifecycle == Lifecycle::Ended)
                    .await
                    .unwrap_or_else(|why| Err(IngestionError::WorkerUnavailable {
                        key,
                        source: why,
                    })),
                Err(why) => Err(IngestionError::WorkerUnavailable { key, source: why }),
            };
            if let Err(why @ IngestionError::WorkerUnavailable { .. }) = &result {
                metrics.error();
                error!("{}", why);
            }
            metrics.set_active_trips(workers.len());
            result
        })
    }

    /// Number of trips that currently have a worker.
    pub fn active_trips(&self) -> usize {
        self.workers.len()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use model::point::Point;
    use reduction::Tolerance;

    use super::*;
    use crate::{
        memory::{MemoryBufferStore, MemoryTripStore},
        testing::SlowBufferStore,
        tolerance::ToleranceControl,
    };

    fn dispatcher<B: BufferStore>(buffer: B, trips: MemoryTripStore) -> Dispatcher<B, MemoryTripStore> {
        let tolerance = ToleranceControl::new(Tolerance::new(0.0).unwrap());
        Dispatcher::new(Coordinator::new(buffer, trips, &tolerance, Arc::new(Metrics::new())))
    }

    fn route(offset: f64, len: usize) -> Vec<Point> {
        (0..len)
            .map(|i| Point::new(offset + i as f64, ((i * 7) % 5) as f64))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn finish_sees_every_point_dispatched_before_it() {
        let buffer = SlowBufferStore::default();
        let trips = MemoryTripStore::new();
        let dispatcher = dispatcher(buffer.clone(), trips.clone());
        let key = TripKey::new("driver", "route");
        let points = route(0.0, 60);

        // the active updates are not awaited before the finish is dispatched
        for (i, point) in points.iter().enumerate() {
            dispatcher.dispatch(PositionUpdate::active(key.clone(), *point, i as u64));
        }
        let outcome = dispatcher
            .dispatch(PositionUpdate::ended(key.clone(), Point::new(0.0, 0.0), 60))
            .await
            .unwrap()
            .unwrap();

        let Outcome::Completed(completed) = outcome else {
            panic!("expected a completed route, got {:?}", outcome);
        };
        assert_eq!(completed.original_points(), 60);
        let record = trips.record(&key).unwrap();
        assert_eq!(record.original_points_count, 60);
        assert!(!buffer.inner.contains(&key));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn interleaved_trips_keep_their_own_points() {
        let buffer = SlowBufferStore::default();
        let trips = MemoryTripStore::new();
        let dispatcher = dispatcher(buffer, trips.clone());
        let a = TripKey::new("driver-a", "route");
        let b = TripKey::new("driver-b", "route");
        let route_a = route(0.0, 40);
        let route_b = route(1000.0, 40);

        for (i, (pa, pb)) in route_a.iter().zip(&route_b).enumerate() {
            dispatcher.dispatch(PositionUpdate::active(a.clone(), *pa, i as u64));
            dispatcher.dispatch(PositionUpdate::active(b.clone(), *pb, i as u64));
        }
        let done_a = dispatcher.dispatch(PositionUpdate::ended(a.clone(), Point::new(0.0, 0.0), 40));
        let done_b = dispatcher.dispatch(PositionUpdate::ended(b.clone(), Point::new(0.0, 0.0), 40));

        let Outcome::Completed(completed_a) = done_a.await.unwrap().unwrap() else {
            panic!("trip a did not complete");
        };
        let Outcome::Completed(completed_b) = done_b.await.unwrap().unwrap() else {
            panic!("trip b did not complete");
        };
        assert_eq!(completed_a.points, reduction::reduce(&route_a, 0.0));
        assert_eq!(completed_b.points, reduction::reduce(&route_b, 0.0));
        assert_eq!(trips.records().len(), 2);
    }

    #[tokio::test]
    async fn workers_are_dropped_after_finish() {
        let dispatcher = dispatcher(MemoryBufferStore::new(), MemoryTripStore::new());
        let key = TripKey::new("d", "r");

        let buffered = dispatcher.dispatch(PositionUpdate::active(key.clone(), Point::new(1.0, 2.0), 1));
        assert_eq!(dispatcher.active_trips(), 1);
        assert_eq!(buffered.await.unwrap().unwrap(), Outcome::Buffered);
        assert_eq!(dispatcher.active_trips(), 1);

        let finished = dispatcher.dispatch(PositionUpdate::ended(key.clone(), Point::new(1.0, 2.0), 2));
        assert!(matches!(finished.await.unwrap().unwrap(), Outcome::Completed(_)));
        assert_eq!(dispatcher.active_trips(), 0);

        // the trip can start over with a fresh worker
        let again = dispatcher.dispatch(PositionUpdate::active(key.clone(), Point::new(3.0, 4.0), 3));
        assert_eq!(again.await.unwrap().unwrap(), Outcome::Buffered);
        assert_eq!(dispatcher.active_trips(), 1);
    }

    #[tokio::test]
    async fn finish_of_unknown_trip_is_empty_and_reaped() {
        let dispatcher = dispatcher(MemoryBufferStore::new(), MemoryTripStore::new());

        let outcome = dispatcher
            .dispatch(PositionUpdate::ended(TripKey::new("d", "r"), Point::new(0.0, 0.0), 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome, Outcome::Empty);
        assert_eq!(dispatcher.active_trips(), 0);
    }
}
