use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A planar coordinate. In this domain `x` is the longitude and `y` the
/// latitude, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }

    pub fn delta(&self, origin: &Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Z component of `(self - origin) x (other - origin)`.
    pub fn cross(&self, origin: &Point, other: &Point) -> f64 {
        let (ax, ay) = self.delta(origin);
        let (bx, by) = other.delta(origin);
        ax * by - ay * bx
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let (dx, dy) = self.delta(other);
        dx.hypot(dy)
    }
}

/// Wire and storage form of a [`Point`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Location> for Point {
    fn from(location: Location) -> Self {
        Point::new(location.longitude, location.latitude)
    }
}

impl From<Point> for Location {
    fn from(point: Point) -> Self {
        Location {
            latitude: point.latitude(),
            longitude: point.longitude(),
        }
    }
}
