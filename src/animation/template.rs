//! Animation templates and the combinators that compose them.
//!
//! An [`Animation`] is an immutable, reusable description of how to write a
//! target's properties as a function of progress in `[0, 1]`. It carries no
//! playback state; the same template can drive any number of targets.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::animation::keys::{KEY_EPSILON, KeyProgress};
use crate::animation::property::{InitialValues, Picked, PropertyId};
use crate::animation::values::{harmonic, harmonic_inverse};
use crate::errors::{MotionError, Result};

/// Writes the animated properties of a target for one progress value.
///
/// Arguments are the target, the progress in `[0, 1]` and the snapshot taken
/// when playback started.
pub type UpdateFn<T> = dyn Fn(&mut T, f64, &InitialValues) -> Result<()>;

/// Immutable animation template acting on targets of type `T`.
pub struct Animation<T> {
    duration: f64,
    update: Rc<UpdateFn<T>>,
    picked: Rc<[Picked<T>]>,
    keys: KeyProgress,
}

impl<T> Clone for Animation<T> {
    fn clone(&self) -> Self {
        Self {
            duration: self.duration,
            update: Rc::clone(&self.update),
            picked: Rc::clone(&self.picked),
            keys: self.keys.clone(),
        }
    }
}

impl<T> fmt::Debug for Animation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("duration", &self.duration)
            .field("picked", &self.picked.iter().map(|p| p.id()).collect::<Vec<_>>())
            .field("keys", &self.keys.as_slice())
            .finish()
    }
}

fn check_duration(duration: f64) -> Result<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(MotionError::InvalidDuration(duration))
    }
}

impl<T: 'static> Animation<T> {
    /// Creates a template that needs no initial values.
    ///
    /// # Errors
    ///
    /// [`MotionError::InvalidDuration`] unless `duration` is finite and positive.
    pub fn new<F>(duration: f64, update: F) -> Result<Self>
    where
        F: Fn(&mut T, f64, &InitialValues) -> Result<()> + 'static,
    {
        Self::with_properties(duration, [], update)
    }

    /// Creates a template whose update function reads the pre-animation value
    /// of every property in `picked`.
    ///
    /// # Errors
    ///
    /// [`MotionError::InvalidDuration`] for a non-positive duration and
    /// [`MotionError::DuplicateProperty`] when a property is picked twice.
    pub fn with_properties<F>(
        duration: f64,
        picked: impl IntoIterator<Item = Picked<T>>,
        update: F,
    ) -> Result<Self>
    where
        F: Fn(&mut T, f64, &InitialValues) -> Result<()> + 'static,
    {
        check_duration(duration)?;

        let picked: Vec<Picked<T>> = picked.into_iter().collect();
        for (i, property) in picked.iter().enumerate() {
            if picked[..i].iter().any(|p| p.id() == property.id()) {
                return Err(MotionError::DuplicateProperty(property.id().name()));
            }
        }

        Ok(Self {
            duration,
            update: Rc::new(update),
            picked: picked.into(),
            keys: KeyProgress::terminal(),
        })
    }

    /// Adds mandatory evaluation points, e.g. the instants where a
    /// threshold-based update function changes behaviour.
    pub fn with_key_progress(mut self, values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let extra = KeyProgress::from_values(values)?;
        self.keys = KeyProgress::normalized(
            self.keys
                .as_slice()
                .iter()
                .chain(extra.as_slice())
                .copied()
                .collect(),
        );
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Duration in seconds.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn key_progress(&self) -> &KeyProgress {
        &self.keys
    }

    pub fn picked_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.picked.iter().map(|p| p.id())
    }

    /// Copies every picked property of `target`.
    #[must_use]
    pub fn snapshot(&self, target: &T) -> InitialValues {
        let mut initial = InitialValues::new();
        for property in self.picked.iter() {
            property.capture(target, &mut initial);
        }
        initial
    }

    /// Runs the update function at `progress` (clamped to `[0, 1]`).
    pub fn evaluate(&self, target: &mut T, progress: f64, initial: &InitialValues) -> Result<()> {
        (self.update)(target, progress.clamp(0.0, 1.0), initial)
    }

    /// Evaluates a child at a remapped progress, snapped onto its own keys.
    fn evaluate_child(&self, target: &mut T, progress: f64, initial: &InitialValues) -> Result<()> {
        self.evaluate(target, self.keys.snap(progress), initial)
    }

    // =========================================================================
    // Combinators
    // =========================================================================

    /// Plays `self` and then `next`.
    ///
    /// Both phases read their initial values from the single snapshot taken
    /// when the composite starts: `next` never observes what `self` wrote.
    /// A second phase animating towards "current value + delta" therefore
    /// starts from the pre-animation value, not from where the first phase
    /// left the property.
    #[must_use]
    pub fn concat(&self, next: &Animation<T>) -> Animation<T> {
        let duration = self.duration + next.duration;
        let seam = self.duration / duration;

        let keys = KeyProgress::normalized(
            self.keys
                .rescaled(0.0, seam)
                .chain(next.keys.rescaled(seam, 1.0 - seam))
                .collect(),
        );

        let first = self.clone();
        let second = next.clone();
        let update = move |target: &mut T, progress: f64, initial: &InitialValues| {
            if progress <= seam {
                first.evaluate_child(target, progress / seam, initial)
            } else {
                second.evaluate_child(target, (progress - seam) / (1.0 - seam), initial)
            }
        };

        Animation {
            duration,
            update: Rc::new(update),
            picked: union_picked(&self.picked, &next.picked),
            keys,
        }
    }

    /// Plays `self` and `other` simultaneously.
    ///
    /// The longer child spans the whole composite; the shorter one (`other` on
    /// a tie) plays over `[0, shortest_end]` and is then no longer invoked, so
    /// its last written value stays in place. Within one evaluation the shorter
    /// child runs first.
    #[must_use]
    pub fn parallel(&self, other: &Animation<T>) -> Animation<T> {
        let (longest, shortest) = if other.duration > self.duration {
            (other.clone(), self.clone())
        } else {
            (self.clone(), other.clone())
        };

        let duration = longest.duration;
        let shortest_end = shortest.duration / duration;

        let keys = KeyProgress::normalized(
            shortest
                .keys
                .rescaled(0.0, shortest_end)
                .chain(longest.keys.as_slice().iter().copied())
                .collect(),
        );

        let update = move |target: &mut T, progress: f64, initial: &InitialValues| {
            if progress <= shortest_end {
                shortest.evaluate_child(target, progress / shortest_end, initial)?;
            }
            longest.evaluate_child(target, progress, initial)
        };

        Animation {
            duration,
            update: Rc::new(update),
            picked: union_picked(&self.picked, &other.picked),
            keys,
        }
    }

    /// Reshapes the flow of time: the result evaluates `self` at
    /// `transform(progress)`.
    ///
    /// `inverse` maps each key progress value back so mandatory frames still
    /// land on their original fractions.
    ///
    /// # Errors
    ///
    /// [`MotionError::InvalidTimeTransform`] if `inverse` sends a key outside
    /// `(0, 1]`, reverses the order of two keys, or does not send 1 to 1.
    pub fn time_transform<F, I>(&self, transform: F, inverse: I) -> Result<Animation<T>>
    where
        F: Fn(f64) -> f64 + 'static,
        I: Fn(f64) -> f64,
    {
        let mut mapped: SmallVec<[f64; 4]> = SmallVec::with_capacity(self.keys.len());
        for &progress in self.keys.as_slice() {
            let value = inverse(progress);
            let out_of_range = !value.is_finite() || value <= 0.0 || value > 1.0 + KEY_EPSILON;
            let out_of_order = mapped.last().is_some_and(|&prev| value < prev - KEY_EPSILON);
            if out_of_range || out_of_order {
                return Err(MotionError::InvalidTimeTransform { progress, mapped: value });
            }
            mapped.push(value.min(1.0));
        }

        if let Some(&last) = mapped.last()
            && (last - 1.0).abs() >= KEY_EPSILON
        {
            return Err(MotionError::InvalidTimeTransform { progress: 1.0, mapped: last });
        }

        Ok(self.remapped(transform, KeyProgress::normalized(mapped)))
    }

    /// Ease-in/ease-out version of the animation (see [`harmonic`]).
    ///
    /// On a linear animation this yields a harmonic one.
    #[must_use]
    pub fn harmonize(&self) -> Animation<T> {
        let keys = KeyProgress::normalized(self.keys.as_slice().iter().map(|&k| harmonic_inverse(k)).collect());
        self.remapped(harmonic, keys)
    }

    fn remapped<F>(&self, transform: F, keys: KeyProgress) -> Animation<T>
    where
        F: Fn(f64) -> f64 + 'static,
    {
        let inner = self.clone();
        let update = move |target: &mut T, progress: f64, initial: &InitialValues| {
            inner.evaluate_child(target, transform(progress).clamp(0.0, 1.0), initial)
        };

        Animation {
            duration: self.duration,
            update: Rc::new(update),
            picked: Rc::clone(&self.picked),
            keys,
        }
    }
}

/// Union of two picked sets, first occurrence wins.
fn union_picked<T>(a: &[Picked<T>], b: &[Picked<T>]) -> Rc<[Picked<T>]> {
    let mut out: Vec<Picked<T>> = a.to_vec();
    for property in b {
        if !out.iter().any(|p| p.id() == property.id()) {
            out.push(Rc::clone(property));
        }
    }
    out.into()
}
