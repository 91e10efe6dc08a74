use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Identifies one trip of one driver and addresses its point buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripKey {
    pub driver_id: String,
    pub route_id: String,
}

impl TripKey {
    pub fn new<D, R>(driver_id: D, route_id: R) -> Self
    where
        D: Into<String>,
        R: Into<String>,
    {
        Self {
            driver_id: driver_id.into(),
            route_id: route_id.into(),
        }
    }
}

/// The buffer store key: `driverId:routeId`.
impl fmt::Display for TripKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.driver_id, self.route_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// The trip continues, the point belongs to its route.
    Active,
    /// The trip is complete.
    Ended,
}

impl Lifecycle {
    pub fn as_status(&self) -> &'static str {
        match self {
            Lifecycle::Active => "in_route",
            Lifecycle::Ended => "finished",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_status())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedStatus(pub String);

impl fmt::Display for UnrecognizedStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unrecognized trip status {:?}", self.0)
    }
}

impl std::error::Error for UnrecognizedStatus {}

impl FromStr for Lifecycle {
    type Err = UnrecognizedStatus;

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status {
            "in_route" => Ok(Lifecycle::Active),
            "finished" => Ok(Lifecycle::Ended),
            _ => Err(UnrecognizedStatus(status.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub key: TripKey,
    pub point: Point,
    pub timestamp: u64,
    pub lifecycle: Lifecycle,
}

impl PositionUpdate {
    pub fn active(key: TripKey, point: Point, timestamp: u64) -> Self {
        Self {
            key,
            point,
            timestamp,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn ended(key: TripKey, point: Point, timestamp: u64) -> Self {
        Self {
            key,
            point,
            timestamp,
            lifecycle: Lifecycle::Ended,
        }
    }
}
