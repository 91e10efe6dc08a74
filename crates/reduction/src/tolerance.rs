use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Maximum perpendicular error a reduction may introduce, in the units of
/// the point coordinates. Always finite and not negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    /// Roughly ten metres when the coordinates are degrees.
    pub const DEFAULT: Tolerance = Tolerance(0.0001);

    pub fn new(value: f64) -> Result<Self, InvalidTolerance> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(InvalidTolerance(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = InvalidTolerance;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

impl FromStr for Tolerance {
    type Err = InvalidTolerance;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidTolerance(f64::NAN))
            .and_then(Self::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidTolerance(pub f64);

impl fmt::Display for InvalidTolerance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "tolerance must be a finite number >= 0, got {}",
            self.0
        )
    }
}

impl std::error::Error for InvalidTolerance {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_and_positive_values() {
        assert_eq!(Tolerance::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Tolerance::new(0.5).unwrap().value(), 0.5);
        assert_eq!(Tolerance::default().value(), 0.0001);
    }

    #[test]
    fn rejects_negative_and_non_finite_values() {
        for value in [-0.0001, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(Tolerance::new(value).is_err(), "{} accepted", value);
        }
    }

    #[test]
    fn parses_from_strings() {
        assert_eq!("0.001".parse::<Tolerance>(), Ok(Tolerance(0.001)));
        assert!("ten metres".parse::<Tolerance>().is_err());
        assert!("-1".parse::<Tolerance>().is_err());
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Tolerance(0.25)).unwrap();
        assert_eq!(json, "0.25");
        assert!(serde_json::from_str::<Tolerance>("-3.0").is_err());
    }
}
