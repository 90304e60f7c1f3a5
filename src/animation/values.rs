use std::f64::consts::PI;

use glam::{DVec2, DVec3, Vec2, Vec3};

use crate::errors::{MotionError, Result};

/// `½(1 + sin(π(t − ½)))`: the ease-in/ease-out S-curve.
///
/// `f(0) = 0`, `f(½) = ½`, `f(1) = 1`, monotonic, zero slope at both ends.
#[inline]
#[must_use]
pub fn harmonic(t: f64) -> f64 {
    0.5 * (1.0 + (PI * (t - 0.5)).sin())
}

/// Inverse of [`harmonic`] on `[0, 1]`.
#[inline]
#[must_use]
pub fn harmonic_inverse(t: f64) -> f64 {
    0.5 + (2.0 * t - 1.0).clamp(-1.0, 1.0).asin() / PI
}

/// How a numeric leaf moves from its start value to its end value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    /// Resembles harmonic motion: slow start, slow end.
    Harmonic,
    /// Constant ratio per unit of progress; suited to zooms.
    Exponential,
}

impl Easing {
    /// Value of one scalar component at `progress`.
    #[inline]
    #[must_use]
    pub fn value(self, progress: f64, start: f64, end: f64) -> f64 {
        match self {
            Easing::Linear => start + progress * (end - start),
            Easing::Harmonic => start + harmonic(progress) * (end - start),
            Easing::Exponential => start * (end / start).powf(progress),
        }
    }

    /// Rejects endpoints the easing cannot interpolate between.
    pub fn check(self, start: f64, end: f64) -> Result<()> {
        match self {
            Easing::Exponential if !exponential_compatible(start, end) => {
                Err(MotionError::InvalidExponentialRange { start, end })
            }
            _ => Ok(()),
        }
    }
}

fn exponential_compatible(start: f64, end: f64) -> bool {
    start != 0.0 && end != 0.0 && start.is_finite() && end.is_finite() && start.signum() == end.signum()
}

/// Values that numeric animations can drive: scalars or fixed-size vectors,
/// interpolated component by component.
pub trait Numeric: Clone + 'static {
    /// Builds a value from matching components of `start` and `end`.
    #[must_use]
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self;

    /// Visits matching components of `start` and `end`, stopping at the first error.
    fn try_for_each_pair(start: &Self, end: &Self, f: impl FnMut(f64, f64) -> Result<()>) -> Result<()>;
}

impl Numeric for f64 {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        f(*start, *end)
    }

    fn try_for_each_pair(start: &Self, end: &Self, mut f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        f(*start, *end)
    }
}

impl Numeric for f32 {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        f(f64::from(*start), f64::from(*end)) as f32
    }

    fn try_for_each_pair(start: &Self, end: &Self, mut f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        f(f64::from(*start), f64::from(*end))
    }
}

impl<const N: usize> Numeric for [f64; N] {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        std::array::from_fn(|i| f(start[i], end[i]))
    }

    fn try_for_each_pair(start: &Self, end: &Self, mut f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        start.iter().zip(end).try_for_each(|(&a, &b)| f(a, b))
    }
}

impl Numeric for DVec2 {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        DVec2::from_array(<[f64; 2]>::combine(&start.to_array(), &end.to_array(), f))
    }

    fn try_for_each_pair(start: &Self, end: &Self, f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        <[f64; 2]>::try_for_each_pair(&start.to_array(), &end.to_array(), f)
    }
}

impl Numeric for DVec3 {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        DVec3::from_array(<[f64; 3]>::combine(&start.to_array(), &end.to_array(), f))
    }

    fn try_for_each_pair(start: &Self, end: &Self, f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        <[f64; 3]>::try_for_each_pair(&start.to_array(), &end.to_array(), f)
    }
}

impl Numeric for Vec2 {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        DVec2::combine(&start.as_dvec2(), &end.as_dvec2(), f).as_vec2()
    }

    fn try_for_each_pair(start: &Self, end: &Self, f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        DVec2::try_for_each_pair(&start.as_dvec2(), &end.as_dvec2(), f)
    }
}

impl Numeric for Vec3 {
    fn combine(start: &Self, end: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        DVec3::combine(&start.as_dvec3(), &end.as_dvec3(), f).as_vec3()
    }

    fn try_for_each_pair(start: &Self, end: &Self, f: impl FnMut(f64, f64) -> Result<()>) -> Result<()> {
        DVec3::try_for_each_pair(&start.as_dvec3(), &end.as_dvec3(), f)
    }
}

/// Interpolates `start → end` with `easing`, validating the endpoints first.
pub fn interpolate<V: Numeric>(easing: Easing, progress: f64, start: &V, end: &V) -> Result<V> {
    V::try_for_each_pair(start, end, |a, b| easing.check(a, b))?;
    Ok(V::combine(start, end, |a, b| easing.value(progress, a, b)))
}
