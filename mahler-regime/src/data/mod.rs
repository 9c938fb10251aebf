//! Tick data types and offline replay.
//!
//! Provides:
//! - `Tick` observations and their validation
//! - CSV loading
//! - Replay of recorded ticks through a detector

pub mod loader;
pub mod replay;
pub mod types;

pub use loader::{load_ticks, read_ticks, LoaderError};
pub use replay::{replay, replay_file, replay_many, ReplayError, ReplayReport};
pub use types::{wall_clock_seconds, ObservationError, Tick};
