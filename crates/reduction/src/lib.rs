//! Shape-preserving reduction of recorded routes.
//!
//! [`reduce`] implements the
//! [Ramer–Douglas–Peucker algorithm](https://en.wikipedia.org/wiki/Ramer%E2%80%93Douglas%E2%80%93Peucker_algorithm)
//! on planar [`Point`](model::point::Point)s, [`compute_stats`] describes
//! how much a reduction removed.

mod rdp;
mod stats;
mod tolerance;

pub use rdp::{perpendicular_distance, reduce};
pub use stats::compute_stats;
pub use tolerance::{InvalidTolerance, Tolerance};
