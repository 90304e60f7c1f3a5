//! Numeric leaf templates.
//!
//! A [`Tween`] moves one property from a start value to an end value with an
//! [`Easing`]. The start value is the one captured when playback begins,
//! unless an explicit one is given with [`Tween::from`].
//!
//! ```rust,ignore
//! let x = property!(Dot, x);
//!
//! // Ease from wherever the dot is to 10.
//! let slide = Tween::harmonic(x, 2.0, 10.0).build()?;
//!
//! // Double the value, whatever it is when the animation starts.
//! let grow = Tween::relative(Easing::Exponential, x, 1.0, |start| start * 2.0).build()?;
//! ```

use std::rc::Rc;

use crate::animation::property::{Property, pick};
use crate::animation::template::Animation;
use crate::animation::values::{Easing, Numeric, interpolate};
use crate::errors::Result;

enum Target<V> {
    Value(V),
    Relative(Rc<dyn Fn(&V) -> V>),
}

impl<V: Clone> Target<V> {
    fn resolve(&self, start: &V) -> V {
        match self {
            Target::Value(end) => end.clone(),
            Target::Relative(end) => end(start),
        }
    }
}

/// Builder for a template that drives a single numeric property.
pub struct Tween<T, V> {
    property: Property<T, V>,
    duration: f64,
    easing: Easing,
    start: Option<V>,
    end: Target<V>,
}

impl<T: 'static, V: Numeric> Tween<T, V> {
    /// Tween towards `end` with the given easing.
    #[must_use]
    pub fn new(easing: Easing, property: Property<T, V>, duration: f64, end: V) -> Self {
        Self {
            property,
            duration,
            easing,
            start: None,
            end: Target::Value(end),
        }
    }

    #[must_use]
    pub fn linear(property: Property<T, V>, duration: f64, end: V) -> Self {
        Self::new(Easing::Linear, property, duration, end)
    }

    #[must_use]
    pub fn harmonic(property: Property<T, V>, duration: f64, end: V) -> Self {
        Self::new(Easing::Harmonic, property, duration, end)
    }

    #[must_use]
    pub fn exponential(property: Property<T, V>, duration: f64, end: V) -> Self {
        Self::new(Easing::Exponential, property, duration, end)
    }

    /// Tween whose end value is computed from the start value.
    #[must_use]
    pub fn relative<F>(easing: Easing, property: Property<T, V>, duration: f64, end: F) -> Self
    where
        F: Fn(&V) -> V + 'static,
    {
        Self {
            property,
            duration,
            easing,
            start: None,
            end: Target::Relative(Rc::new(end)),
        }
    }

    /// Starts from `start` instead of the captured value.
    #[must_use]
    pub fn from(mut self, start: V) -> Self {
        self.start = Some(start);
        self
    }

    /// Builds the template.
    ///
    /// # Errors
    ///
    /// [`MotionError::InvalidDuration`](crate::errors::MotionError::InvalidDuration)
    /// for a non-positive duration. When both endpoints are known up front
    /// they are checked against the easing here; otherwise they are checked
    /// on every evaluation.
    pub fn build(self) -> Result<Animation<T>> {
        let Self {
            property,
            duration,
            easing,
            start,
            end,
        } = self;

        if let (Some(start), Target::Value(end)) = (&start, &end) {
            interpolate(easing, 0.0, start, end)?;
        }

        let picked = if start.is_none() { vec![pick(property)] } else { Vec::new() };

        Animation::with_properties(duration, picked, move |target: &mut T, progress, initial| {
            let start = match &start {
                Some(start) => start,
                None => property.initial(initial)?,
            };
            let end = end.resolve(start);
            let value = interpolate(easing, progress, start, &end)?;
            // The terminal frame lands on the end value exactly.
            property.set(target, if progress >= 1.0 { end } else { value });
            Ok(())
        })
    }
}

/// Template driving one property through an arbitrary function of progress
/// and the captured start value.
pub fn animate_property<T, V, F>(property: Property<T, V>, duration: f64, value: F) -> Result<Animation<T>>
where
    T: 'static,
    V: 'static,
    F: Fn(f64, &V) -> V + 'static,
{
    Animation::with_properties(duration, [pick(property)], move |target: &mut T, progress, initial| {
        let start = property.initial(initial)?;
        property.set(target, value(progress, start));
        Ok(())
    })
}
