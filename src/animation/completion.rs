//! Single-resolution completion channel.
//!
//! Every playing animation owns a [`Completer`]; the caller that registered it
//! keeps the matching [`CompletionHandle`]. The slot they share is resolved at
//! most once, with one of:
//!
//! - `Ok(())` when the animation ran its terminal frame
//! - `Err(MotionError::Cancelled)` when it was cancelled or dropped early
//! - any other `Err` when its update function or target failed
//!
//! The handle is a [`Future`], so a host that sequences animations with
//! `async` code can simply `.await` it. The engine itself never waits on it.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::errors::{MotionError, Result};

type Callback = Box<dyn FnOnce(&Result<()>)>;

enum Slot {
    Pending {
        callbacks: Vec<Callback>,
        waker: Option<Waker>,
    },
    Resolved(Result<()>),
}

impl Default for Slot {
    fn default() -> Self {
        Slot::Pending {
            callbacks: Vec::new(),
            waker: None,
        }
    }
}

fn settle(slot: &RefCell<Slot>, outcome: Result<()>) -> Result<()> {
    let previous = {
        let mut slot = slot.borrow_mut();
        if matches!(*slot, Slot::Resolved(_)) {
            return Err(MotionError::AlreadyResolved);
        }
        std::mem::replace(&mut *slot, Slot::Resolved(outcome.clone()))
    };

    // The borrow is released: callbacks may inspect the handle.
    if let Slot::Pending { callbacks, waker } = previous {
        for callback in callbacks {
            // A failing callback must not stop the others or the caller's pass.
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&outcome))).is_err() {
                log::error!("Completion callback panicked");
            }
        }
        if let Some(waker) = waker {
            waker.wake();
        }
    }
    Ok(())
}

/// Creates a connected completer/handle pair.
#[must_use]
pub fn completion() -> (Completer, CompletionHandle) {
    let slot = Rc::new(RefCell::new(Slot::default()));
    (
        Completer {
            slot: Rc::clone(&slot),
        },
        CompletionHandle { slot },
    )
}

/// Engine side of a completion.
///
/// Dropping a completer that has not been resolved resolves it with
/// [`MotionError::Cancelled`].
pub struct Completer {
    slot: Rc<RefCell<Slot>>,
}

impl Completer {
    /// Resolves the completion.
    ///
    /// # Errors
    ///
    /// [`MotionError::AlreadyResolved`] if it was resolved before, including by
    /// [`CompletionHandle::cancel`].
    pub fn resolve(&self, outcome: Result<()>) -> Result<()> {
        settle(&self.slot, outcome)
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Resolved(_))
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        if !self.is_resolved() {
            log::debug!("Completer dropped before resolution; reporting cancellation");
            let _ = settle(&self.slot, Err(MotionError::Cancelled));
        }
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Caller side of a completion: observe, await or cancel an animation.
#[derive(Clone)]
pub struct CompletionHandle {
    slot: Rc<RefCell<Slot>>,
}

impl CompletionHandle {
    /// A handle that is already resolved with `outcome`.
    #[must_use]
    pub fn resolved(outcome: Result<()>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Resolved(outcome))),
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Resolved(_))
    }

    /// `true` once the animation has finished normally.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Resolved(Ok(())))
    }

    /// The outcome, if resolved.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<()>> {
        match &*self.slot.borrow() {
            Slot::Resolved(outcome) => Some(outcome.clone()),
            Slot::Pending { .. } => None,
        }
    }

    /// Runs `callback` exactly once with the outcome: immediately if already
    /// resolved, otherwise when the completion resolves.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(&Result<()>) + 'static,
    {
        let resolved = {
            let mut slot = self.slot.borrow_mut();
            match &mut *slot {
                Slot::Pending { callbacks, .. } => {
                    callbacks.push(Box::new(callback));
                    return;
                }
                Slot::Resolved(outcome) => outcome.clone(),
            }
        };
        callback(&resolved);
    }

    /// Cancels the animation.
    ///
    /// The completion resolves with [`MotionError::Cancelled`] right away and
    /// the scheduler discards the animation on its next pass without
    /// advancing it. Returns `false` if the completion was already resolved.
    pub fn cancel(&self) -> bool {
        settle(&self.slot, Err(MotionError::Cancelled)).is_ok()
    }
}

impl Future for CompletionHandle {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match &mut *slot {
            Slot::Resolved(outcome) => Poll::Ready(outcome.clone()),
            Slot::Pending { waker, .. } => {
                *waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("outcome", &self.outcome())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_resolves_once() {
        let (completer, handle) = completion();
        assert!(!handle.is_resolved());

        completer.resolve(Ok(())).unwrap();
        assert!(handle.is_finished());
        assert_eq!(completer.resolve(Ok(())), Err(MotionError::AlreadyResolved));
    }

    #[test]
    fn test_callbacks_fire_exactly_once() {
        let (completer, handle) = completion();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        handle.on_complete(move |outcome| {
            assert!(outcome.is_ok());
            counter.set(counter.get() + 1);
        });

        completer.resolve(Ok(())).unwrap();
        let _ = completer.resolve(Ok(()));
        assert_eq!(calls.get(), 1);

        // Late subscribers are called immediately.
        let counter = Rc::clone(&calls);
        handle.on_complete(move |_| counter.set(counter.get() + 1));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_cancel_wins_over_late_resolve() {
        let (completer, handle) = completion();
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(completer.is_resolved());
        assert_eq!(completer.resolve(Ok(())), Err(MotionError::AlreadyResolved));
        assert_eq!(handle.outcome(), Some(Err(MotionError::Cancelled)));
    }

    #[test]
    fn test_panicking_callback_does_not_block_others() {
        let (completer, handle) = completion();
        let calls = Rc::new(Cell::new(0));

        handle.on_complete(|_| panic!("callback failed"));
        let counter = Rc::clone(&calls);
        handle.on_complete(move |_| counter.set(counter.get() + 1));

        assert!(completer.resolve(Ok(())).is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_dropped_completer_cancels() {
        let (completer, handle) = completion();
        drop(completer);
        assert_eq!(handle.outcome(), Some(Err(MotionError::Cancelled)));
    }
}
