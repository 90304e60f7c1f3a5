//! Utility Module
//!
//! - [`FrameClock`]: the discrete tick counter driven by the host loop
//! - [`time::frames_for`]: seconds to ticks conversion shared by the engine

pub mod time;

pub use time::FrameClock;
