use crate::settings::ClockSettings;

/// Discrete frame clock driven by the host loop.
///
/// The tick counter only moves forward; the host advances it exactly once per
/// rendered frame and the engine converts second-based durations into ticks
/// with the configured rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    tick: u64,
    settings: ClockSettings,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockSettings::default())
    }
}

impl FrameClock {
    /// Creates a clock at tick 0.
    #[must_use]
    pub fn new(settings: ClockSettings) -> Self {
        Self { tick: 0, settings }
    }

    /// Current tick.
    #[inline]
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the clock by one tick and returns the new tick.
    #[inline]
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> u32 {
        self.settings.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ClockSettings {
        &self.settings
    }

    /// Converts a duration in seconds into a whole number of ticks (floored).
    #[inline]
    #[must_use]
    pub fn frames_for(&self, seconds: f64) -> u64 {
        frames_for(seconds, self.settings.ticks_per_second)
    }

    /// Time elapsed since tick 0, in seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 / f64::from(self.settings.ticks_per_second)
    }
}

/// `⌊seconds × ticks_per_second⌋`, saturating at zero for negative input.
#[inline]
#[must_use]
pub fn frames_for(seconds: f64, ticks_per_second: u32) -> u64 {
    (seconds * f64::from(ticks_per_second)).floor().max(0.0) as u64
}
