//! 2D camera built on the animation engine.
//!
//! A [`View`] looks at `zoom_center` on an infinite plane, magnified by
//! `zoom_factor`. Every camera move is an ordinary template composed from
//! tweens, so it plays, cancels and completes like any other animation.

use glam::DVec2;

use crate::animation::completion::CompletionHandle;
use crate::animation::numeric::Tween;
use crate::animation::registry::{Animatable, AnimationRegistry};
use crate::animation::template::Animation;
use crate::errors::Result;
use crate::property;
use crate::utils::time::FrameClock;

/// How the `zoom_factor` argument of the zoom methods is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomMode {
    /// The argument is the final zoom factor.
    Absolute,
    /// The argument multiplies the current zoom factor.
    #[default]
    Relative,
}

/// Camera over a two-dimensional plane.
pub struct View {
    pub zoom_mode: ZoomMode,
    pub zoom_center: DVec2,
    pub zoom_factor: f64,
    animations: AnimationRegistry<View>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            zoom_mode: ZoomMode::default(),
            zoom_center: DVec2::ZERO,
            zoom_factor: 1.0,
            animations: AnimationRegistry::new(),
        }
    }
}

impl Animatable for View {
    fn animations(&mut self) -> &mut AnimationRegistry<Self> {
        &mut self.animations
    }
}

impl View {
    #[must_use]
    pub fn new(zoom_center: DVec2, zoom_factor: f64) -> Self {
        Self {
            zoom_center,
            zoom_factor,
            ..Self::default()
        }
    }

    /// Smoothly moves the camera to `zoom_center` without zooming.
    pub fn move_to(&mut self, clock: &FrameClock, duration: f64, zoom_center: DVec2) -> Result<CompletionHandle> {
        let animation = Tween::harmonic(property!(View, zoom_center), duration, zoom_center).build()?;
        Ok(self.animate(clock, &animation))
    }

    /// Smoothly moves the camera by `amount` without zooming.
    pub fn move_by(&mut self, clock: &FrameClock, duration: f64, amount: DVec2) -> Result<CompletionHandle> {
        let zoom_center = self.zoom_center + amount;
        self.move_to(clock, duration, zoom_center)
    }

    /// Smoothly changes the zoom factor around the current center.
    pub fn zoom(&mut self, clock: &FrameClock, duration: f64, zoom_factor: f64) -> Result<CompletionHandle> {
        let zoom_factor = self.to_absolute(zoom_factor);
        let animation = Tween::exponential(property!(View, zoom_factor), duration, zoom_factor)
            .build()?
            .harmonize();
        Ok(self.animate(clock, &animation))
    }

    /// Moves to `zoom_center` while zooming, keeping the motion of the plane
    /// proportional to the zoom.
    pub fn zoom_to_point(
        &mut self,
        clock: &FrameClock,
        duration: f64,
        zoom_center: DVec2,
        zoom_factor: f64,
    ) -> Result<CompletionHandle> {
        let zoom_factor = self.to_absolute(zoom_factor);
        let animation = zoom_path(duration, self.zoom_center, self.zoom_factor, zoom_center, zoom_factor)?;
        Ok(self.animate(clock, &animation))
    }

    /// Zooms out until both the current and the target point are visible,
    /// then zooms into the target, moving all the while.
    pub fn jump_to_point(
        &mut self,
        clock: &FrameClock,
        duration: f64,
        zoom_center: DVec2,
        zoom_factor: f64,
    ) -> Result<CompletionHandle> {
        let (z_a, f_a) = (self.zoom_center, self.zoom_factor);
        let f_b = self.to_absolute(zoom_factor);

        let Some((z_m, f_m)) = intermediate_zoom(z_a, f_a, zoom_center, f_b) else {
            return self.zoom_to_point(clock, duration, zoom_center, zoom_factor);
        };

        // Instant at which the zoom changes direction.
        let change = duration * (f_m / f_a).ln() / (f_m * f_m / (f_a * f_b)).ln();
        if !(change > 0.0 && change < duration) {
            return self.zoom_to_point(clock, duration, zoom_center, zoom_factor);
        }

        let outward = zoom_path(change, z_a, f_a, z_m, f_m)?;
        let inward = zoom_path(duration - change, z_m, f_m, zoom_center, f_b)?;
        let animation = outward.concat(&inward);
        Ok(self.animate(clock, &animation))
    }

    fn to_absolute(&self, zoom_factor: f64) -> f64 {
        match self.zoom_mode {
            ZoomMode::Relative => zoom_factor * self.zoom_factor,
            ZoomMode::Absolute => zoom_factor,
        }
    }
}

/// Camera path from `(z_a, f_a)` to `(z_b, f_b)` with explicit start values.
fn zoom_path(duration: f64, z_a: DVec2, f_a: f64, z_b: DVec2, f_b: f64) -> Result<Animation<View>> {
    // Equal zoom factors break the translation formula.
    if f_a == f_b {
        return Tween::harmonic(property!(View, zoom_center), duration, z_b).from(z_a).build();
    }

    let translate = Animation::new(duration, move |view: &mut View, progress, _| {
        // Driven by the zoom factor written in the same tick, not by progress.
        let f_t = view.zoom_factor;
        view.zoom_center = if progress >= 1.0 {
            z_b
        } else {
            z_a + (1.0 - f_a / f_t) / (1.0 - f_a / f_b) * (z_b - z_a)
        };
        Ok(())
    })?;
    let zoom = Tween::exponential(property!(View, zoom_factor), duration, f_b).from(f_a).build()?;

    Ok(translate.parallel(&zoom).harmonize())
}

/// Zoom at which both points fit in view, and the center that gives both
/// halves of a jump the same peak translational speed.
fn intermediate_zoom(z_a: DVec2, f_a: f64, z_b: DVec2, f_b: f64) -> Option<(DVec2, f64)> {
    let f_m = 0.25 / z_a.distance(z_b);
    if !f_m.is_finite() {
        return None;
    }

    let w_a = (1.0 / f_m - 1.0 / f_b) * (f_a / f_m).ln();
    let w_b = (1.0 / f_a - 1.0 / f_m) * (f_m / f_b).ln();
    let z_m = (w_a * z_a + w_b * z_b) / (w_a + w_b);

    z_m.is_finite().then_some((z_m, f_m))
}
