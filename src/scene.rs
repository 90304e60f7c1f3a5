//! Ordered show-list of animated objects.
//!
//! A [`Scene`] advances and draws every object it holds, once per frame, in
//! the order the objects were added.

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::registry::Animatable;
use crate::utils::time::FrameClock;

/// Anything a scene can show each frame.
pub trait Showable {
    fn show(&mut self, clock: &FrameClock);
}

impl<T: Animatable> Showable for T {
    fn show(&mut self, clock: &FrameClock) {
        Animatable::show(self, clock);
    }
}

pub type SharedShowable = Rc<RefCell<dyn Showable>>;

#[derive(Default)]
pub struct Scene {
    objects: Vec<SharedShowable>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends objects; they are shown after the ones already present.
    pub fn add(&mut self, objects: impl IntoIterator<Item = SharedShowable>) {
        self.objects.extend(objects);
    }

    /// Removes every occurrence of `object`. Returns `true` if any was found.
    pub fn remove(&mut self, object: &SharedShowable) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| !Rc::ptr_eq(o, object));
        before != self.objects.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Shows every object in order. Objects borrowed elsewhere are skipped
    /// for this frame.
    pub fn render(&self, clock: &FrameClock) {
        for object in &self.objects {
            match object.try_borrow_mut() {
                Ok(mut object) => object.show(clock),
                Err(_) => log::warn!("Scene object is borrowed; skipped at tick {}", clock.tick()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::registry::AnimationRegistry;
    use crate::animation::template::Animation;

    #[derive(Default)]
    struct Dot {
        x: f64,
        draws: Vec<f64>,
        animations: AnimationRegistry<Dot>,
    }

    impl Animatable for Dot {
        fn animations(&mut self) -> &mut AnimationRegistry<Self> {
            &mut self.animations
        }

        fn draw(&mut self) {
            self.draws.push(self.x);
        }
    }

    #[test]
    fn test_render_advances_then_draws_in_order() {
        let mut clock = FrameClock::default();
        let first = Rc::new(RefCell::new(Dot::default()));
        let second = Rc::new(RefCell::new(Dot::default()));

        let ramp = Animation::new(1.0, |dot: &mut Dot, progress, _| {
            dot.x = progress;
            Ok(())
        })
        .unwrap();
        first.borrow_mut().animate(&clock, &ramp);

        let mut scene = Scene::new();
        scene.add([first.clone() as SharedShowable, second.clone() as SharedShowable]);
        scene.render(&clock);
        clock.advance();
        scene.render(&clock);

        assert_eq!(first.borrow().draws.len(), 2);
        assert!((first.borrow().draws[1] - 1.0 / 30.0).abs() < 1e-12);
        assert_eq!(second.borrow().draws, vec![0.0, 0.0]);
    }

    #[test]
    fn test_remove_by_identity() {
        let dot: SharedShowable = Rc::new(RefCell::new(Dot::default()));
        let other: SharedShowable = Rc::new(RefCell::new(Dot::default()));

        let mut scene = Scene::new();
        scene.add([Rc::clone(&dot), Rc::clone(&other), Rc::clone(&dot)]);
        assert!(scene.remove(&dot));
        assert_eq!(scene.len(), 1);
        assert!(!scene.remove(&dot));
    }
}
