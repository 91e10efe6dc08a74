use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use model::route::RouteStats;
use serde::Serialize;

/// Service counters, updated lock-free from every worker.
#[derive(Debug, Default)]
pub struct Metrics {
    messages_processed: AtomicU64,
    messages_rejected: AtomicU64,
    points_buffered: AtomicU64,
    routes_completed: AtomicU64,
    routes_empty: AtomicU64,
    errors: AtomicU64,
    original_points: AtomicU64,
    reduced_points: AtomicU64,
    active_trips: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// A payload that could not be decoded into a position update.
    pub fn message_rejected(&self) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn point_buffered(&self) {
        self.points_buffered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn route_completed(&self, stats: &RouteStats) {
        self.routes_completed.fetch_add(1, Ordering::Relaxed);
        self.original_points
            .fetch_add(stats.original_points as u64, Ordering::Relaxed);
        self.reduced_points
            .fetch_add(stats.reduced_points as u64, Ordering::Relaxed);
    }

    pub fn route_empty(&self) {
        self.routes_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_active_trips(&self, count: usize) {
        self.active_trips.store(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let original_points = self.original_points.load(Ordering::Relaxed);
        let reduced_points = self.reduced_points.load(Ordering::Relaxed);
        let compression_ratio = if original_points == 0 {
            0.0
        } else {
            reduced_points as f64 / original_points as f64
        };
        MetricsSnapshot {
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
            points_buffered: self.points_buffered.load(Ordering::Relaxed),
            routes_completed: self.routes_completed.load(Ordering::Relaxed),
            routes_empty: self.routes_empty.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            active_trips: self.active_trips.load(Ordering::Relaxed),
            original_points,
            reduced_points,
            compression_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub messages_processed: u64,
    pub messages_rejected: u64,
    pub points_buffered: u64,
    pub routes_completed: u64,
    pub routes_empty: u64,
    pub errors: u64,
    pub active_trips: usize,
    pub original_points: u64,
    pub reduced_points: u64,
    /// Reduced over original points across all completed routes.
    pub compression_ratio: f64,
}
