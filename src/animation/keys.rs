use smallvec::SmallVec;

use crate::errors::{MotionError, Result};

/// Two key progress values closer than this are the same key.
pub const KEY_EPSILON: f64 = 1e-9;

/// Sorted set of progress values at which an animation must be evaluated exactly.
///
/// Invariants: non-empty, strictly increasing, every value in `(0, 1]`, and the
/// last value is exactly `1.0`, so the terminal frame always runs at progress 1.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyProgress {
    values: SmallVec<[f64; 4]>,
}

impl Default for KeyProgress {
    fn default() -> Self {
        Self::terminal()
    }
}

impl KeyProgress {
    /// The key set of an elementary animation: only the final frame.
    #[must_use]
    pub fn terminal() -> Self {
        let mut values = SmallVec::new();
        values.push(1.0);
        Self { values }
    }

    /// Builds a key set from user supplied values; `1.0` is always added.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut raw: SmallVec<[f64; 4]> = SmallVec::new();
        for value in values {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(MotionError::InvalidKeyProgress(value));
            }
            raw.push(value);
        }
        raw.push(1.0);
        Ok(Self::normalized(raw))
    }

    /// Sorts, deduplicates and pins the terminal key to exactly `1.0`.
    ///
    /// Callers guarantee every value is finite, within `[0, 1]` and that the
    /// largest one is within [`KEY_EPSILON`] of 1.
    pub(crate) fn normalized(mut raw: SmallVec<[f64; 4]>) -> Self {
        raw.sort_by(f64::total_cmp);
        raw.dedup_by(|later, earlier| (*later - *earlier).abs() < KEY_EPSILON);
        match raw.last_mut() {
            Some(last) if (*last - 1.0).abs() < KEY_EPSILON => *last = 1.0,
            _ => raw.push(1.0),
        }
        Self { values: raw }
    }

    /// Keys of `self` placed on the interval `[start, start + length]`.
    pub(crate) fn rescaled(&self, start: f64, length: f64) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().map(move |&k| start + length * k)
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; the set holds at least the terminal key.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Returns the key equal to `progress` up to [`KEY_EPSILON`], or `progress`.
    ///
    /// Combinators remap progress with floating point arithmetic; snapping the
    /// result back onto a child key keeps exact keyframes on the correct side
    /// of a threshold.
    #[must_use]
    pub fn snap(&self, progress: f64) -> f64 {
        let idx = self.values.partition_point(|&k| k < progress);
        let above = self.values.get(idx).copied();
        let below = idx.checked_sub(1).and_then(|i| self.values.get(i).copied());

        [above, below]
            .into_iter()
            .flatten()
            .find(|k| (k - progress).abs() < KEY_EPSILON)
            .unwrap_or(progress)
    }
}

/// Position of the next key a playing animation will reach.
///
/// Only ever moves forward, one key per update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyCursor {
    pub next_index: usize,
}

impl KeyCursor {
    /// The key the cursor is waiting for.
    #[inline]
    #[must_use]
    pub fn pending(&self, keys: &KeyProgress) -> Option<f64> {
        keys.get(self.next_index)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.next_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_contains_one() {
        let keys = KeyProgress::terminal();
        assert_eq!(keys.as_slice(), &[1.0]);
        assert!(!keys.is_empty());
    }

    #[test]
    fn test_from_values_sorts_and_adds_terminal() {
        let keys = KeyProgress::from_values([0.75, 0.25, 0.5, 0.25]).unwrap();
        assert_eq!(keys.as_slice(), &[0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_from_values_rejects_out_of_range() {
        assert_eq!(
            KeyProgress::from_values([0.0]),
            Err(MotionError::InvalidKeyProgress(0.0))
        );
        assert!(KeyProgress::from_values([1.5]).is_err());
        assert!(KeyProgress::from_values([f64::NAN]).is_err());
    }

    #[test]
    fn test_normalized_pins_terminal() {
        let keys = KeyProgress::normalized(SmallVec::from_slice(&[0.5, 1.0 - 1e-12]));
        assert_eq!(keys.as_slice(), &[0.5, 1.0]);
    }

    #[test]
    fn test_snap() {
        let keys = KeyProgress::from_values([0.25]).unwrap();
        assert_eq!(keys.snap(0.25 + 1e-12), 0.25);
        assert_eq!(keys.snap(0.25 - 1e-12), 0.25);
        assert_eq!(keys.snap(1.0 - 1e-12), 1.0);
        assert_eq!(keys.snap(0.3), 0.3);
    }

    #[test]
    fn test_cursor_walks_keys() {
        let keys = KeyProgress::from_values([0.5]).unwrap();
        let mut cursor = KeyCursor::default();
        assert_eq!(cursor.pending(&keys), Some(0.5));
        cursor.advance();
        assert_eq!(cursor.pending(&keys), Some(1.0));
        cursor.advance();
        assert_eq!(cursor.pending(&keys), None);
    }
}
