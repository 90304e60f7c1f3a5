//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`MotionError`] covers three families of failure:
//! - Configuration errors, rejected when a template or setting is built
//! - Runtime invariant violations inside the playback engine
//! - Failures raised by user code (update functions, targets) during a tick
//!
//! Cancellation is reported through the same type ([`MotionError::Cancelled`])
//! so a completion handle has a single failure path.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MotionError>`.
//!
//! ```rust,ignore
//! use fractal_motion::errors::{MotionError, Result};
//!
//! fn build() -> Result<()> {
//!     Err(MotionError::InvalidDuration(0.0))
//! }
//! ```

use thiserror::Error;

/// The main error type for the animation engine.
///
/// The type is `Clone` because the outcome of an animation is stored in its
/// completion handle and may be inspected more than once.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Durations must be finite and strictly positive.
    #[error("Invalid animation duration: {0} (must be finite and > 0)")]
    InvalidDuration(f64),

    /// The same property was picked twice by one template.
    #[error("Property `{0}` was picked more than once")]
    DuplicateProperty(&'static str),

    /// A key progress value fell outside `(0, 1]`.
    #[error("Invalid key progress value: {0} (must lie in (0, 1])")]
    InvalidKeyProgress(f64),

    /// A time transform's inverse produced an unusable key progress value.
    #[error("Time transform maps key progress {progress} to {mapped}")]
    InvalidTimeTransform {
        /// The original key progress value
        progress: f64,
        /// The value produced by the inverse transform
        mapped: f64,
    },

    /// Exponential interpolation needs non-zero endpoints of the same sign.
    #[error("Exponential animation endpoints must be non-zero and share a sign: {start} -> {end}")]
    InvalidExponentialRange {
        /// Start value (component)
        start: f64,
        /// End value (component)
        end: f64,
    },

    /// Clock or engine settings could not be parsed or validated.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // ========================================================================
    // Runtime Invariant Violations
    // ========================================================================
    /// `update()` was called on an animation that already finished.
    #[error("Animation updated after it finished")]
    AlreadyFinished,

    /// A completion was resolved more than once.
    #[error("Completion resolved more than once")]
    AlreadyResolved,

    /// The snapshot does not hold a value the update function asked for.
    #[error("No initial value was captured for property `{0}`")]
    MissingInitialValue(&'static str),

    // ========================================================================
    // User Callback Errors
    // ========================================================================
    /// An update function returned an error or panicked.
    #[error("Update function failed: {0}")]
    UpdateFailed(String),

    /// The target was already mutably borrowed when the scheduler reached it.
    #[error("Animation target is already borrowed")]
    TargetBorrowed,

    /// The target was dropped before the animation finished.
    #[error("Animation target was dropped")]
    TargetDropped,

    // ========================================================================
    // Cancellation
    // ========================================================================
    /// The animation was cancelled before it finished.
    #[error("Animation was cancelled")]
    Cancelled,
}

impl MotionError {
    /// Returns `true` for the cancellation signal.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        MotionError::InvalidSettings(err.to_string())
    }
}

/// Alias for `Result<T, MotionError>`.
pub type Result<T> = std::result::Result<T, MotionError>;
