use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{point::Location, route::ReducedRoute};

/// One stored trip, written once when the trip is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub driver_id: String,
    pub current_route_id: String,
    pub simplified_route: Vec<Location>,
    pub timestamp: i64,
    pub original_points_count: i64,
    pub simplified_points_count: i64,
    pub compression_ratio: f64,
    pub reduction_percent: f64,
    pub processed_at: DateTime<Utc>,
}

impl TripRecord {
    pub fn new(route: &ReducedRoute, processed_at: DateTime<Utc>) -> Self {
        Self {
            driver_id: route.key.driver_id.clone(),
            current_route_id: route.key.route_id.clone(),
            simplified_route: route.points.iter().copied().map(Location::from).collect(),
            // timestamps beyond i64::MAX are not produced by any real clock
            timestamp: i64::try_from(route.timestamp).unwrap_or(i64::MAX),
            original_points_count: route.stats.original_points as i64,
            simplified_points_count: route.stats.reduced_points as i64,
            compression_ratio: route.stats.ratio,
            reduction_percent: route.stats.reduction_percent,
            processed_at,
        }
    }
}
