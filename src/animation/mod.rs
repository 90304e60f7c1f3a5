//! Animation System
//!
//! Templates, playback and scheduling for property animations.
//!
//! - [`Animation`]: immutable template, composed with `concat`, `parallel`,
//!   `time_transform` and `harmonize`
//! - [`Tween`] / [`animate_property`]: numeric leaf templates
//! - [`PlayingAnimation`]: one template bound to one target
//! - [`AnimationRegistry`] / [`Animatable`]: per-object playback
//! - [`Scheduler`]: playback on shared targets from one frame clock
//! - [`CompletionHandle`]: exactly-once completion signal

pub mod completion;
pub mod keys;
pub mod numeric;
pub mod playing;
pub mod property;
pub mod registry;
pub mod scheduler;
pub mod template;
pub mod values;

pub use completion::{Completer, CompletionHandle, completion};
pub use keys::{KEY_EPSILON, KeyCursor, KeyProgress};
pub use numeric::{Tween, animate_property};
pub use playing::PlayingAnimation;
pub use property::{InitialValues, PickProperty, Picked, Property, PropertyId, pick};
pub use registry::{Animatable, AnimationRegistry};
pub use scheduler::Scheduler;
pub use template::{Animation, UpdateFn};
pub use values::{Easing, Numeric, harmonic, harmonic_inverse, interpolate};
