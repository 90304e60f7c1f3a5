//! Scheduler and Completion Tests
//!
//! Tests for:
//! - Scheduler playback on shared targets
//! - Exactly-once completion, observed through callbacks and as a future
//! - Cancellation, dropped targets and delay timers
//! - Clock settings loaded from JSON

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::executor::block_on;

use fractal_motion::animation::{Animation, Tween};
use fractal_motion::{ClockSettings, MotionError, Scheduler, property};

const EPSILON: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Debug, Default)]
struct Point {
    x: f64,
    y: f64,
}

fn shared(x: f64, y: f64) -> Rc<RefCell<Point>> {
    Rc::new(RefCell::new(Point { x, y }))
}

fn slide_x(duration: f64, end: f64) -> Animation<Point> {
    Tween::linear(property!(Point, x), duration, end).build().unwrap()
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn scheduler_runs_animation_to_completion() -> anyhow::Result<()> {
    init_logger();
    let mut scheduler = Scheduler::new(ClockSettings::default());
    let point = shared(0.0, 0.0);

    let done = scheduler.animate(&point, &slide_x(1.0, 10.0));
    scheduler.update_animations();
    for _ in 0..29 {
        scheduler.tick();
    }
    assert!(approx(point.borrow().x, 29.0 / 3.0));
    assert!(done.clone().now_or_never().is_none());

    assert_eq!(scheduler.tick(), 30);
    assert_eq!(point.borrow().x, 10.0);
    assert!(scheduler.is_empty());

    block_on(done)?;
    Ok(())
}

#[test]
fn animations_on_different_targets_run_together() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let a = shared(0.0, 0.0);
    let b = shared(0.0, 5.0);

    let up = Tween::linear(property!(Point, y), 2.0, 25.0).build().unwrap();
    let first = scheduler.animate(&a, &slide_x(1.0, 10.0));
    let second = scheduler.animate(&b, &up);
    assert_eq!(scheduler.len(), 2);

    for _ in 0..10 {
        scheduler.tick();
    }
    assert!(first.is_finished());
    assert!(!second.is_resolved());
    assert!(approx(b.borrow().y, 15.0));

    for _ in 0..10 {
        scheduler.tick();
    }
    assert!(second.is_finished());
    assert_eq!(b.borrow().y, 25.0);
}

#[test]
fn later_registration_wins_on_shared_target() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let point = shared(0.0, 0.0);

    scheduler.animate(&point, &slide_x(1.0, 10.0));
    scheduler.animate(&point, &slide_x(1.0, -10.0));

    for _ in 0..10 {
        scheduler.tick();
    }
    assert_eq!(point.borrow().x, -10.0);
}

#[test]
fn update_target_only_touches_that_target() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let a = shared(1.0, 0.0);
    let b = shared(1.0, 0.0);
    let from_zero = Tween::linear(property!(Point, x), 1.0, 10.0).from(0.0).build().unwrap();
    scheduler.animate(&a, &from_zero);
    scheduler.animate(&b, &from_zero);

    scheduler.update_target(&b);
    assert_eq!(a.borrow().x, 1.0);
    assert_eq!(b.borrow().x, 0.0);
    assert_eq!(scheduler.len(), 2);
}

// ============================================================================
// Completion
// ============================================================================

#[test]
fn callbacks_fire_exactly_once() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(4).unwrap());
    let point = shared(0.0, 0.0);
    let calls = Rc::new(Cell::new(0));

    let done = scheduler.animate(&point, &slide_x(1.0, 1.0));
    for _ in 0..2 {
        let counter = Rc::clone(&calls);
        done.on_complete(move |_| counter.set(counter.get() + 1));
    }

    for _ in 0..10 {
        scheduler.tick();
    }
    assert_eq!(calls.get(), 2);
    assert_eq!(done.outcome(), Some(Ok(())));
}

#[test]
fn callback_can_read_the_finished_target() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let point = shared(0.0, 0.0);
    let seen = Rc::new(Cell::new(f64::NAN));

    let done = scheduler.animate(&point, &slide_x(1.0, 10.0));
    let (target, slot) = (Rc::clone(&point), Rc::clone(&seen));
    done.on_complete(move |_| slot.set(target.borrow().x));

    for _ in 0..10 {
        scheduler.tick();
    }
    assert_eq!(done.outcome(), Some(Ok(())));
    assert_eq!(seen.get(), 10.0);
}

#[test]
fn failure_callback_can_read_the_target() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let point = shared(3.0, 0.0);
    let seen = Rc::new(Cell::new(f64::NAN));

    let broken = Animation::new(1.0, |_: &mut Point, _, _| Err(MotionError::UpdateFailed("broken".into()))).unwrap();
    let done = scheduler.animate(&point, &broken);
    let (target, slot) = (Rc::clone(&point), Rc::clone(&seen));
    done.on_complete(move |_| slot.set(target.borrow().x));

    scheduler.update_animations();
    assert_eq!(done.outcome(), Some(Err(MotionError::UpdateFailed("broken".into()))));
    assert_eq!(seen.get(), 3.0);
}

#[test]
fn cancel_removes_animation_without_advancing() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let point = shared(0.0, 0.0);
    let done = scheduler.animate(&point, &slide_x(1.0, 10.0));

    scheduler.tick();
    let before = point.borrow().x;
    assert!(done.cancel());

    scheduler.tick();
    assert_eq!(point.borrow().x, before);
    assert!(scheduler.is_empty());
    assert_eq!(block_on(done), Err(MotionError::Cancelled));
}

#[test]
fn dropped_target_resolves_with_error() {
    let mut scheduler = Scheduler::default();
    let point = shared(0.0, 0.0);
    let done = scheduler.animate(&point, &slide_x(1.0, 10.0));

    drop(point);
    scheduler.tick();

    assert_eq!(done.outcome(), Some(Err(MotionError::TargetDropped)));
    assert!(scheduler.is_empty());
}

#[test]
fn failed_update_is_reported_and_others_continue() {
    init_logger();
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let point = shared(0.0, 0.0);

    let broken = Animation::new(1.0, |_: &mut Point, progress, _| {
        if progress > 0.5 {
            panic!("update exploded");
        }
        Ok(())
    })
    .unwrap();
    let failed = scheduler.animate(&point, &broken);
    let fine = scheduler.animate(&point, &slide_x(1.0, 10.0));

    for _ in 0..10 {
        scheduler.tick();
    }
    assert_eq!(
        failed.outcome(),
        Some(Err(MotionError::UpdateFailed("update exploded".to_string())))
    );
    assert!(fine.is_finished());
    assert_eq!(point.borrow().x, 10.0);
}

#[test]
fn cancel_all_cancels_everything() {
    let mut scheduler = Scheduler::default();
    let point = shared(0.0, 0.0);
    let handles = [
        scheduler.animate(&point, &slide_x(1.0, 1.0)),
        scheduler.animate(&point, &slide_x(2.0, 1.0)),
        scheduler.delay(3.0),
    ];

    scheduler.cancel_all();
    assert!(scheduler.is_empty());
    assert_eq!(scheduler.pending_timers(), 0);
    for handle in handles {
        assert_eq!(handle.outcome(), Some(Err(MotionError::Cancelled)));
    }
}

// ============================================================================
// Timers
// ============================================================================

#[test]
fn delay_resolves_after_its_duration() {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(20).unwrap());
    let wait = scheduler.delay(0.5);

    for _ in 0..9 {
        scheduler.tick();
    }
    assert!(wait.clone().now_or_never().is_none());

    scheduler.tick();
    assert_eq!(wait.now_or_never(), Some(Ok(())));
    assert_eq!(scheduler.pending_timers(), 0);
}

#[test]
fn delay_then_animate_sequence() -> anyhow::Result<()> {
    let mut scheduler = Scheduler::new(ClockSettings::with_rate(10).unwrap());
    let point = shared(0.0, 0.0);

    let pause = scheduler.delay(0.5);
    let started = Rc::new(Cell::new(false));
    let flag = Rc::clone(&started);
    pause.on_complete(move |outcome| flag.set(outcome.is_ok()));

    while !started.get() {
        scheduler.tick();
    }
    assert_eq!(scheduler.clock().tick(), 5);

    let done = scheduler.animate(&point, &slide_x(0.5, 5.0));
    for _ in 0..5 {
        scheduler.tick();
    }
    block_on(done)?;
    assert_eq!(point.borrow().x, 5.0);
    Ok(())
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn settings_from_json() -> anyhow::Result<()> {
    let settings = ClockSettings::from_json(r#"{ "ticks_per_second": 24 }"#)?;
    assert_eq!(settings.ticks_per_second, 24);

    let defaults = ClockSettings::from_json("{}")?;
    assert_eq!(defaults, ClockSettings::default());

    assert!(matches!(
        ClockSettings::from_json(r#"{ "ticks_per_second": 0 }"#),
        Err(MotionError::InvalidSettings(_))
    ));
    Ok(())
}
