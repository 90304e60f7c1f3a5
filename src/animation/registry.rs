use crate::animation::completion::CompletionHandle;
use crate::animation::playing::PlayingAnimation;
use crate::animation::template::Animation;
use crate::utils::time::FrameClock;

/// Ordered list of the animations playing on one object.
///
/// Insertion order is registration order, which decides who writes last when
/// two animations drive the same property in the same tick.
pub struct AnimationRegistry<T> {
    entries: Vec<PlayingAnimation<T>>,
}

impl<T> Default for AnimationRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: 'static> AnimationRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an animation that is already playing.
    pub fn push(&mut self, playing: PlayingAnimation<T>) {
        self.entries.push(playing);
    }

    /// Appends every entry of `other`, keeping its order.
    pub fn append(&mut self, mut other: AnimationRegistry<T>) {
        self.entries.append(&mut other.entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances every animation once, in registration order, and removes the
    /// ones that finished, failed or were cancelled.
    ///
    /// Returns the number of entries removed.
    pub fn update(&mut self, target: &mut T, tick: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|playing| {
            if playing.is_cancelled() {
                log::debug!("Dropping cancelled animation (began at tick {})", playing.begin_tick());
                return false;
            }
            match playing.update(target, tick) {
                Ok(finished) => !finished,
                Err(err) => {
                    log::warn!("Removing failed animation at tick {tick}: {err}");
                    false
                }
            }
        });
        before - self.entries.len()
    }

    /// Removes every entry; their handles resolve with `Cancelled`.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }
}

/// An object that carries its own animations.
///
/// Implementors only expose their registry; registration and per-tick
/// advancing are provided.
///
/// ```rust,ignore
/// struct Cube { side: f64, animations: AnimationRegistry<Cube> }
///
/// impl Animatable for Cube {
///     fn animations(&mut self) -> &mut AnimationRegistry<Self> {
///         &mut self.animations
///     }
/// }
///
/// let done = cube.animate(&clock, &shrink);
/// // every frame:
/// cube.show(&clock);
/// ```
pub trait Animatable: Sized + 'static {
    fn animations(&mut self) -> &mut AnimationRegistry<Self>;

    /// Starts `animation` on this object at the clock's current tick.
    fn animate(&mut self, clock: &FrameClock, animation: &Animation<Self>) -> CompletionHandle {
        let (playing, handle) =
            PlayingAnimation::new(self, animation, clock.tick(), clock.ticks_per_second());
        log::debug!(
            "Registered {:.3}s animation ({} ticks) at tick {}",
            animation.duration(),
            playing.frame_duration(),
            clock.tick()
        );
        self.animations().push(playing);
        handle
    }

    /// Advances this object's animations to the clock's current tick.
    fn update_animations(&mut self, clock: &FrameClock) {
        // The registry leaves the object for the pass so the object itself
        // can be lent to each animation.
        let mut registry = std::mem::take(self.animations());
        registry.update(self, clock.tick());

        // Animations registered by update functions during the pass go last.
        let added = std::mem::replace(self.animations(), registry);
        self.animations().append(added);
    }

    /// Draws the object. Called by [`show`](Self::show) after the animations
    /// have been advanced.
    fn draw(&mut self) {}

    /// Per-frame hook: advance, then draw.
    fn show(&mut self, clock: &FrameClock) {
        self.update_animations(clock);
        self.draw();
    }
}
