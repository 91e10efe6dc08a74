use serde::Serialize;

use crate::{point::Point, trip::TripKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub original_points: usize,
    pub reduced_points: usize,
    pub removed: usize,
    /// `reduced_points / original_points`, 0 for an empty route.
    pub ratio: f64,
    pub reduction_percent: f64,
    /// Planar polyline lengths in coordinate units.
    pub original_length: f64,
    pub reduced_length: f64,
    pub original_length_km: f64,
    pub reduced_length_km: f64,
}

/// The result of reducing one completed trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedRoute {
    pub key: TripKey,
    pub points: Vec<Point>,
    pub timestamp: u64,
    pub stats: RouteStats,
}

impl ReducedRoute {
    pub fn original_points(&self) -> usize {
        self.stats.original_points
    }

    pub fn reduced_points(&self) -> usize {
        self.stats.reduced_points
    }
}
