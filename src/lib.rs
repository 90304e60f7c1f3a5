#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod scene;
pub mod settings;
pub mod utils;
pub mod view;

pub use animation::{
    Animatable, Animation, AnimationRegistry, CompletionHandle, Easing, InitialValues, KeyProgress, Numeric,
    PlayingAnimation, Property, Scheduler, Tween, animate_property, pick,
};
pub use errors::{MotionError, Result};
pub use scene::{Scene, Showable};
pub use settings::ClockSettings;
pub use utils::FrameClock;
pub use view::{View, ZoomMode};
