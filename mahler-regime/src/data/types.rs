//! Core observation types.
//!
//! A tick is a single (price, volume, timestamp) observation for one
//! instrument. Ticks are stored as received; sanitizing happens where the
//! values are used.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection reasons for the strict recording path.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ObservationError {
    #[error("Invalid observation: {field} = {value}")]
    InvalidObservation { field: &'static str, value: f64 },
}

/// Single market observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Trade or mid price.
    pub price: f64,
    /// Traded volume for the observation.
    pub volume: f64,
    /// Unix time in fractional seconds.
    pub timestamp: f64,
}

impl Tick {
    pub fn new(price: f64, volume: f64, timestamp: f64) -> Self {
        Self {
            price,
            volume,
            timestamp,
        }
    }

    /// Build a tick, stamping it with the current wall-clock time if no
    /// timestamp is given.
    pub fn at(price: f64, volume: f64, timestamp: Option<f64>) -> Self {
        Self::new(price, volume, timestamp.unwrap_or_else(wall_clock_seconds))
    }

    /// Whether price and volume are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check price and volume, reporting the first offending field.
    pub fn validate(&self) -> Result<(), ObservationError> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ObservationError::InvalidObservation {
                field: "price",
                value: self.price,
            });
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(ObservationError::InvalidObservation {
                field: "volume",
                value: self.volume,
            });
        }
        Ok(())
    }
}

/// Current Unix time in fractional seconds.
pub fn wall_clock_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_default_timestamp() {
        let before = wall_clock_seconds();
        let tick = Tick::at(100.0, 10.0, None);
        assert!(tick.timestamp >= before);

        let tick = Tick::at(100.0, 10.0, Some(42.0));
        assert_eq!(tick.timestamp, 42.0);
    }

    #[test]
    fn test_validate() {
        assert!(Tick::new(100.0, 0.0, 0.0).is_valid());
        assert!(Tick::new(0.0, 5.0, 0.0).is_valid());

        let err = Tick::new(f64::NAN, 1.0, 0.0).validate().unwrap_err();
        assert!(matches!(
            err,
            ObservationError::InvalidObservation { field: "price", .. }
        ));

        let err = Tick::new(10.0, -1.0, 0.0).validate().unwrap_err();
        assert_eq!(
            err,
            ObservationError::InvalidObservation {
                field: "volume",
                value: -1.0
            }
        );

        assert!(!Tick::new(f64::INFINITY, 1.0, 0.0).is_valid());
        assert!(!Tick::new(-5.0, 1.0, 0.0).is_valid());
    }
}
