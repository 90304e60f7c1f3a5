//! Global animation scheduler.
//!
//! Owns the frame clock and every animation started through it. Targets are
//! shared `Rc<RefCell<T>>` objects; the scheduler only keeps a weak reference
//! to each one, so dropping a target while it is animated ends its animations
//! with [`MotionError::TargetDropped`] instead of keeping the object alive.
//!
//! # Per-tick order
//!
//! 1. Delay timers whose end tick has been reached resolve.
//! 2. Animations advance in registration order, so when two of them write the
//!    same property in one tick the later registration wins.
//! 3. Finished, failed and cancelled entries are removed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::animation::completion::{Completer, CompletionHandle, completion};
use crate::animation::playing::PlayingAnimation;
use crate::animation::template::Animation;
use crate::errors::{MotionError, Result};
use crate::settings::ClockSettings;
use crate::utils::time::FrameClock;

/// Type-erased scheduler entry.
trait Scheduled {
    /// Whether this entry animates the object at `target`.
    fn targets(&self, target: *const ()) -> bool;

    fn is_cancelled(&self) -> bool;

    /// Advances the entry to `tick`; `Ok(true)` once it has finished.
    fn update(&mut self, tick: u64) -> Result<bool>;
}

struct Bound<T> {
    target: Weak<RefCell<T>>,
    playing: PlayingAnimation<T>,
}

impl<T: 'static> Scheduled for Bound<T> {
    fn targets(&self, target: *const ()) -> bool {
        std::ptr::eq(self.target.as_ptr().cast::<()>(), target)
    }

    fn is_cancelled(&self) -> bool {
        self.playing.is_cancelled()
    }

    fn update(&mut self, tick: u64) -> Result<bool> {
        let Some(target) = self.target.upgrade() else {
            self.playing.fail(MotionError::TargetDropped)?;
            return Err(MotionError::TargetDropped);
        };
        let outcome = {
            let Ok(mut target) = target.try_borrow_mut() else {
                self.playing.fail(MotionError::TargetBorrowed)?;
                return Err(MotionError::TargetBorrowed);
            };
            self.playing.advance_to(&mut target, tick)
        };
        // The target is released: completion callbacks may borrow it.
        self.playing.settle(outcome)
    }
}

struct Timer {
    end_tick: u64,
    completer: Completer,
}

/// Drives animations on shared targets from a single frame clock.
pub struct Scheduler {
    clock: FrameClock,
    entries: Vec<Box<dyn Scheduled>>,
    timers: Vec<Timer>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(ClockSettings::default())
    }
}

impl Scheduler {
    #[must_use]
    pub fn new(settings: ClockSettings) -> Self {
        Self {
            clock: FrameClock::new(settings),
            entries: Vec::new(),
            timers: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Number of animations still playing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of delay timers still running.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Starts `animation` on `target` at the current tick.
    ///
    /// The target's picked properties are snapshotted now. If the target is
    /// mutably borrowed at this point the returned handle is already resolved
    /// with [`MotionError::TargetBorrowed`].
    pub fn animate<T: 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        animation: &Animation<T>,
    ) -> CompletionHandle {
        let tick = self.clock.tick();
        let Ok(borrowed) = target.try_borrow() else {
            log::warn!("Cannot start animation: target is mutably borrowed");
            return CompletionHandle::resolved(Err(MotionError::TargetBorrowed));
        };

        let (playing, handle) =
            PlayingAnimation::new(&*borrowed, animation, tick, self.clock.ticks_per_second());
        log::debug!(
            "Scheduled {:.3}s animation ({} ticks) at tick {tick}",
            animation.duration(),
            playing.frame_duration()
        );

        self.entries.push(Box::new(Bound {
            target: Rc::downgrade(target),
            playing,
        }));
        handle
    }

    /// A completion that resolves once `seconds` have elapsed on the clock.
    ///
    /// Durations shorter than one tick resolve on the next update.
    pub fn delay(&mut self, seconds: f64) -> CompletionHandle {
        let (completer, handle) = completion();
        let end_tick = self.clock.tick() + self.clock.frames_for(seconds);
        log::trace!("Delay of {seconds}s ends at tick {end_tick}");
        self.timers.push(Timer { end_tick, completer });
        handle
    }

    /// Advances the clock by one tick, then updates everything.
    pub fn tick(&mut self) -> u64 {
        let tick = self.clock.advance();
        self.update_animations();
        tick
    }

    /// Updates every timer and animation at the current tick.
    ///
    /// A failing animation is removed and reported through its handle; the
    /// remaining entries still run.
    pub fn update_animations(&mut self) {
        let tick = self.clock.tick();

        self.timers.retain(|timer| {
            if timer.completer.is_resolved() {
                return false;
            }
            if tick < timer.end_tick {
                return true;
            }
            if let Err(err) = timer.completer.resolve(Ok(())) {
                log::error!("Delay timer ending at tick {} resolved twice: {err}", timer.end_tick);
            }
            false
        });

        self.entries.retain_mut(|entry| update_entry(entry.as_mut(), tick));
    }

    /// Updates only the animations bound to `target`.
    pub fn update_target<T: 'static>(&mut self, target: &Rc<RefCell<T>>) {
        let tick = self.clock.tick();
        let key = Rc::as_ptr(target).cast::<()>();

        self.entries.retain_mut(|entry| {
            if entry.targets(key) {
                update_entry(entry.as_mut(), tick)
            } else {
                true
            }
        });
    }

    /// Drops every animation and timer; their handles resolve with
    /// [`MotionError::Cancelled`].
    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() || !self.timers.is_empty() {
            log::debug!(
                "Cancelling {} animations and {} timers",
                self.entries.len(),
                self.timers.len()
            );
        }
        self.entries.clear();
        self.timers.clear();
    }
}

/// Runs one entry; `false` means it must be removed.
fn update_entry(entry: &mut dyn Scheduled, tick: u64) -> bool {
    if entry.is_cancelled() {
        return false;
    }
    match entry.update(tick) {
        Ok(finished) => !finished,
        Err(err) => {
            log::warn!("Removing failed animation at tick {tick}: {err}");
            false
        }
    }
}
