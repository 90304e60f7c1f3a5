use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::animation::completion::{Completer, CompletionHandle, completion};
use crate::animation::keys::KeyCursor;
use crate::animation::property::InitialValues;
use crate::animation::template::Animation;
use crate::errors::{MotionError, Result};
use crate::utils::time::frames_for;

/// One template bound to one target and one completion.
///
/// The target is not stored: whoever owns it lends it to [`update`](Self::update)
/// once per tick.
#[derive(Debug)]
pub struct PlayingAnimation<T> {
    animation: Animation<T>,
    begin_tick: u64,
    frame_duration: u64,
    initial: InitialValues,
    cursor: KeyCursor,
    completer: Completer,
    finished: bool,
    last_tick: Option<u64>,
}

impl<T: 'static> PlayingAnimation<T> {
    /// Starts playing `animation` on `target` at `begin_tick`.
    ///
    /// Snapshots every picked property of the target now; later changes to
    /// the target are never seen through the snapshot.
    #[must_use]
    pub fn new(
        target: &T,
        animation: &Animation<T>,
        begin_tick: u64,
        ticks_per_second: u32,
    ) -> (Self, CompletionHandle) {
        let (completer, handle) = completion();
        let playing = Self {
            animation: animation.clone(),
            begin_tick,
            frame_duration: frames_for(animation.duration(), ticks_per_second),
            initial: animation.snapshot(target),
            cursor: KeyCursor::default(),
            completer,
            finished: false,
            last_tick: None,
        };
        (playing, handle)
    }

    #[inline]
    #[must_use]
    pub fn begin_tick(&self) -> u64 {
        self.begin_tick
    }

    /// Duration in ticks, `⌊duration × ticks_per_second⌋`.
    #[inline]
    #[must_use]
    pub fn frame_duration(&self) -> u64 {
        self.frame_duration
    }

    #[inline]
    #[must_use]
    pub fn key_cursor(&self) -> KeyCursor {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn initial_values(&self) -> &InitialValues {
        &self.initial
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `true` if the completion was resolved from outside (cancelled) before
    /// the animation got to finish.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        !self.finished && self.completer.is_resolved()
    }

    /// Unclamped progress at `tick`. A zero-tick animation is complete at once.
    #[must_use]
    pub fn progress_at(&self, tick: u64) -> f64 {
        if self.frame_duration == 0 {
            return 1.0;
        }
        tick.saturating_sub(self.begin_tick) as f64 / self.frame_duration as f64
    }

    /// Advances the animation to `tick`, writing into `target`.
    ///
    /// Every key progress value reached since the previous update is
    /// evaluated exactly, in order, before the current progress is written.
    /// Returns `Ok(true)` when this call finished the animation; its
    /// completion has then been resolved. A cancelled animation is not
    /// advanced and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// If the update function fails or panics, the animation is finished with
    /// that error, which is also delivered through the completion handle.
    /// Updating an animation that already finished is
    /// [`MotionError::AlreadyFinished`].
    pub fn update(&mut self, target: &mut T, tick: u64) -> Result<bool> {
        let outcome = self.advance_to(target, tick);
        self.settle(outcome)
    }

    /// Same as [`update`](Self::update) but leaves the completion pending, so
    /// the caller can release `target` before callbacks run. The outcome must
    /// be passed to [`settle`](Self::settle).
    pub(crate) fn advance_to(&mut self, target: &mut T, tick: u64) -> Result<bool> {
        if self.finished {
            log::error!("PlayingAnimation updated after finishing (tick {tick})");
            return Err(MotionError::AlreadyFinished);
        }
        if self.is_cancelled() {
            return Ok(false);
        }

        // At most one advance per tick.
        if self.last_tick == Some(tick) {
            return Ok(false);
        }
        self.last_tick = Some(tick);

        let progress = self.progress_at(tick);
        log::trace!("tick {tick}: progress {progress:.4}");

        match self.advance(target, progress) {
            Ok(true) => {
                self.finished = true;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(err) => {
                log::warn!("Animation failed at progress {progress:.4}: {err}");
                self.finished = true;
                Err(err)
            }
        }
    }

    /// Resolves the completion for an outcome of [`advance_to`](Self::advance_to).
    pub(crate) fn settle(&mut self, outcome: Result<bool>) -> Result<bool> {
        if !self.finished || self.completer.is_resolved() {
            return outcome;
        }
        match outcome {
            Ok(finished) => {
                self.completer.resolve(Ok(()))?;
                Ok(finished)
            }
            Err(err) => {
                self.completer.resolve(Err(err.clone()))?;
                Err(err)
            }
        }
    }

    /// Ends the animation with `err` without running it again, e.g. when its
    /// target has gone away.
    pub fn fail(&mut self, err: MotionError) -> Result<()> {
        if self.finished {
            return Err(MotionError::AlreadyFinished);
        }
        log::warn!("Animation aborted: {err}");
        self.finish(Err(err))
    }

    fn advance(&mut self, target: &mut T, progress: f64) -> Result<bool> {
        let keys = self.animation.key_progress();

        while let Some(key) = self.cursor.pending(keys) {
            if progress < key {
                break;
            }
            // Exact keyframe, even if the tick grid stepped over it.
            self.evaluate(target, key)?;
            if self.cursor.next_index + 1 == keys.len() {
                return Ok(true);
            }
            self.cursor.advance();
        }

        self.evaluate(target, progress.min(1.0))?;
        Ok(false)
    }

    fn evaluate(&self, target: &mut T, progress: f64) -> Result<()> {
        let animation = &self.animation;
        let initial = &self.initial;
        panic::catch_unwind(AssertUnwindSafe(|| animation.evaluate(target, progress, initial)))
            .unwrap_or_else(|payload| Err(MotionError::UpdateFailed(panic_message(payload.as_ref()))))
    }

    fn finish(&mut self, outcome: Result<()>) -> Result<()> {
        self.finished = true;
        self.completer.resolve(outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "update function panicked".to_string()
    }
}
