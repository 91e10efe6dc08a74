use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    point::{Location, Point},
    trip::{Lifecycle, PositionUpdate, TripKey, UnrecognizedStatus},
    ExampleData,
};

/// A position report as published on the `drivers_location/<driverId>` topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocationMessage {
    pub driver_id: String,
    pub driver_location: Location,
    pub timestamp: u64,
    pub current_route_id: String,
    /// `in_route` while the trip continues, `finished` for its last report.
    pub status: String,
}

impl ExampleData for DriverLocationMessage {
    fn example_data() -> Self {
        Self {
            driver_id: "driver-1".to_string(),
            driver_location: Location {
                latitude: 54.3233,
                longitude: 10.1228,
            },
            timestamp: 1_717_000_000_000,
            current_route_id: "route-31".to_string(),
            status: Lifecycle::Active.as_status().to_string(),
        }
    }
}

#[derive(Debug)]
pub enum DecodeError {
    Malformed(serde_json::Error),
    UnrecognizedStatus(UnrecognizedStatus),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Malformed(why) => write!(f, "malformed position update: {}", why),
            Self::UnrecognizedStatus(why) => write!(f, "{}", why),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(why) => Some(why),
            Self::UnrecognizedStatus(why) => Some(why),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(why: serde_json::Error) -> Self {
        Self::Malformed(why)
    }
}

impl From<UnrecognizedStatus> for DecodeError {
    fn from(why: UnrecognizedStatus) -> Self {
        Self::UnrecognizedStatus(why)
    }
}

impl TryFrom<DriverLocationMessage> for PositionUpdate {
    type Error = UnrecognizedStatus;

    fn try_from(message: DriverLocationMessage) -> Result<Self, Self::Error> {
        Ok(PositionUpdate {
            lifecycle: message.status.parse()?,
            key: TripKey::new(message.driver_id, message.current_route_id),
            point: Point::from(message.driver_location),
            timestamp: message.timestamp,
        })
    }
}

/// Decodes a raw feed payload into a [`PositionUpdate`].
pub fn decode(payload: &[u8]) -> Result<PositionUpdate, DecodeError> {
    let message: DriverLocationMessage = serde_json::from_slice(payload)?;
    Ok(PositionUpdate::try_from(message)?)
}
