//! Clock Settings
//!
//! The engine has no notion of wall-clock time. Durations are given in
//! seconds and converted to ticks with a fixed ticks-per-second rate, which
//! is the only configuration the playback engine needs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fractal_motion::ClockSettings;
//!
//! // Default: fast preview rate (30 ticks per second)
//! let settings = ClockSettings::default();
//!
//! // Production rate for final renders
//! let settings = ClockSettings::production();
//!
//! // Loaded from a JSON config file
//! let settings = ClockSettings::from_json(r#"{ "ticks_per_second": 24 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{MotionError, Result};

/// Tick rate used by fast previews.
pub const PREVIEW_TICKS_PER_SECOND: u32 = 30;

/// Tick rate used by production renders.
pub const PRODUCTION_TICKS_PER_SECOND: u32 = 60;

/// Configuration of the frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSettings {
    /// Number of discrete ticks per second of animation time.
    pub ticks_per_second: u32,
}

impl Default for ClockSettings {
    #[inline]
    fn default() -> Self {
        Self {
            ticks_per_second: PREVIEW_TICKS_PER_SECOND,
        }
    }
}

impl ClockSettings {
    /// Settings for final renders.
    #[inline]
    #[must_use]
    pub fn production() -> Self {
        Self {
            ticks_per_second: PRODUCTION_TICKS_PER_SECOND,
        }
    }

    /// Creates settings with the given rate, rejecting a zero rate.
    pub fn with_rate(ticks_per_second: u32) -> Result<Self> {
        let settings = Self { ticks_per_second };
        settings.validate()?;
        Ok(settings)
    }

    /// Parses and validates settings from a JSON document.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the settings can drive a clock.
    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_second == 0 {
            return Err(MotionError::InvalidSettings(
                "ticks_per_second must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_preview_rate() {
        assert_eq!(ClockSettings::default().ticks_per_second, 30);
        assert_eq!(ClockSettings::production().ticks_per_second, 60);
    }

    #[test]
    fn test_from_json() {
        let settings = ClockSettings::from_json(r#"{ "ticks_per_second": 24 }"#).unwrap();
        assert_eq!(settings.ticks_per_second, 24);

        let settings = ClockSettings::from_json("{}").unwrap();
        assert_eq!(settings, ClockSettings::default());
    }

    #[test]
    fn test_rejects_zero_rate() {
        assert!(matches!(
            ClockSettings::from_json(r#"{ "ticks_per_second": 0 }"#),
            Err(MotionError::InvalidSettings(_))
        ));
        assert!(ClockSettings::with_rate(0).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            ClockSettings::from_json("ticks_per_second = 30"),
            Err(MotionError::InvalidSettings(_))
        ));
    }
}
