//! Periodic callbacks
//!
//! A [`Timer`] wraps a callback with an interval and an elapsed-time
//! accumulator. The first fire after construction always runs the
//! callback, which gives every timer a deterministic anchor point; after
//! that it runs once the accumulated time reaches the interval.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::{CadenceError, Result};

/// Callback invoked with the time covered by the fire, in seconds
pub type TimerCallback = Box<dyn FnMut(f32) -> Result<()>>;

struct TimerInner {
    interval: Cell<f32>,
    /// `None` until the first fire
    elapsed: Cell<Option<f32>>,
    callback: RefCell<TimerCallback>,
}

/// Shared timer handle; clones refer to the same timer
#[derive(Clone)]
pub struct Timer {
    inner: Rc<TimerInner>,
}

impl Timer {
    /// Create a timer firing every `interval` seconds (0.0 fires every tick)
    pub fn new<F>(interval: f32, callback: F) -> Self
    where
        F: FnMut(f32) -> Result<()> + 'static,
    {
        Self {
            inner: Rc::new(TimerInner {
                interval: Cell::new(interval),
                elapsed: Cell::new(None),
                callback: RefCell::new(Box::new(callback)),
            }),
        }
    }

    pub fn interval(&self) -> f32 {
        self.inner.interval.get()
    }

    pub fn set_interval(&self, interval: f32) {
        self.inner.interval.set(interval);
    }

    /// Time accumulated since the last fire, `None` before the first one
    pub fn elapsed(&self) -> Option<f32> {
        self.inner.elapsed.get()
    }

    /// Whether both handles refer to the same timer
    pub fn ptr_eq(&self, other: &Timer) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Advance the accumulator by `dt` and run the callback if due
    ///
    /// Returns whether the callback ran. The accumulator restarts from zero
    /// after every fire; overshoot is dropped, not carried forward.
    pub fn fire(&self, dt: f32) -> Result<bool> {
        let covered = match self.inner.elapsed.get() {
            None => dt,
            Some(elapsed) => {
                let elapsed = elapsed + dt;
                if elapsed < self.inner.interval.get() {
                    self.inner.elapsed.set(Some(elapsed));
                    return Ok(false);
                }
                elapsed
            }
        };
        self.inner.elapsed.set(Some(0.0));

        let mut callback = self
            .inner
            .callback
            .try_borrow_mut()
            .map_err(|_| CadenceError::TimerBusy)?;
        (*callback)(covered)?;
        Ok(true)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("interval", &self.interval())
            .field("elapsed", &self.elapsed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_timer(interval: f32) -> (Timer, Rc<RefCell<Vec<f32>>>) {
        let fires = Rc::new(RefCell::new(Vec::new()));
        let log = fires.clone();
        let timer = Timer::new(interval, move |covered| {
            log.borrow_mut().push(covered);
            Ok(())
        });
        (timer, fires)
    }

    #[test]
    fn test_first_fire_is_immediate() {
        let (timer, fires) = counting_timer(0.1);

        assert!(timer.fire(0.05).unwrap());
        assert_eq!(fires.borrow().len(), 1);

        // Anchor is the first fire, so the next one needs a full interval
        assert!(!timer.fire(0.05).unwrap());
        assert!(timer.fire(0.05).unwrap());
        assert_eq!(fires.borrow().len(), 2);
        assert!(!timer.fire(0.05).unwrap());
    }

    #[test]
    fn test_overshoot_is_not_carried() {
        let (timer, fires) = counting_timer(1.0);

        timer.fire(0.0).unwrap();
        assert!(timer.fire(1.5).unwrap());
        assert_eq!(timer.elapsed(), Some(0.0));
        assert!(!timer.fire(0.75).unwrap());
        assert_eq!(fires.borrow().as_slice(), &[0.0, 1.5]);
    }

    #[test]
    fn test_zero_interval_fires_every_call() {
        let (timer, fires) = counting_timer(0.0);

        for _ in 0..4 {
            assert!(timer.fire(0.25).unwrap());
        }
        assert_eq!(fires.borrow().as_slice(), &[0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_zero_dt_does_not_fire_positive_interval() {
        let (timer, fires) = counting_timer(0.5);

        timer.fire(0.0).unwrap();
        assert!(!timer.fire(0.0).unwrap());
        assert_eq!(fires.borrow().len(), 1);
    }

    #[test]
    fn test_callback_error_propagates() {
        let timer = Timer::new(0.0, |_| Err(CadenceError::NotRunning { action: "test" }));

        assert_eq!(
            timer.fire(0.1),
            Err(CadenceError::NotRunning { action: "test" })
        );
    }
}
