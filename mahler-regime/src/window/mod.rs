//! Bounded observation storage.
//!
//! Provides:
//! - Fixed-capacity circular buffers
//! - Per-instrument store of ticks, volatility samples and past detections

pub mod rolling;
pub mod store;

pub use rolling::RollingWindow;
pub use store::{WindowStore, DETECTION_HISTORY_CAPACITY, VOLATILITY_HISTORY_CAPACITY};
