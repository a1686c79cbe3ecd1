//! Frame scheduler
//!
//! Owns the set of active timers and advances them once per tick.
//!
//! Timers may be scheduled or unscheduled from inside a timer callback
//! while a tick is in progress. Such calls only touch the pending sets,
//! which are committed at the start of the next tick, so the iteration in
//! flight never observes them.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::Result;
use crate::timer::Timer;

type PendingTimers = SmallVec<[Timer; 4]>;

struct SchedulerState {
    active: Vec<Timer>,
    to_add: PendingTimers,
    to_remove: PendingTimers,
    time_scale: f32,
}

impl SchedulerState {
    fn commit_pending(&mut self) {
        for timer in self.to_remove.drain(..) {
            self.active.retain(|active| !active.ptr_eq(&timer));
        }
        self.active.extend(self.to_add.drain(..));
    }
}

/// The scheduler that ticks all active timers
///
/// A cheap handle: clones share the same timer set, so callbacks can keep
/// one to schedule follow-up work. Exactly one scheduler is expected per
/// running application; it is owned by whatever drives the main loop.
#[derive(Clone)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState {
                active: Vec::new(),
                to_add: SmallVec::new(),
                to_remove: SmallVec::new(),
                time_scale: 1.0,
            })),
        }
    }

    /// Global multiplier applied to every tick's `dt`
    pub fn time_scale(&self) -> f32 {
        self.state.borrow().time_scale
    }

    /// Values below 1.0 slow everything down, values above speed it up
    pub fn set_time_scale(&self, time_scale: f32) {
        debug!(time_scale, "scheduler time scale changed");
        self.state.borrow_mut().time_scale = time_scale;
    }

    /// Register a timer to be fired from the next tick on
    ///
    /// Idempotent. Scheduling a timer that is pending removal cancels the
    /// removal instead, so the timer keeps running uninterrupted.
    pub fn schedule(&self, timer: &Timer) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.to_remove.iter().position(|t| t.ptr_eq(timer)) {
            state.to_remove.remove(index);
            debug!("timer removal cancelled");
            return;
        }
        let known = state.to_add.iter().any(|t| t.ptr_eq(timer))
            || state.active.iter().any(|t| t.ptr_eq(timer));
        if !known {
            state.to_add.push(timer.clone());
            debug!(interval = timer.interval(), "timer scheduled");
        }
    }

    /// Stop firing a timer from the next tick on
    ///
    /// Cancels a pending addition outright; an active timer is removed when
    /// the next tick commits. Unknown timers are ignored.
    pub fn unschedule(&self, timer: &Timer) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.to_add.iter().position(|t| t.ptr_eq(timer)) {
            state.to_add.remove(index);
            debug!("pending timer dropped");
            return;
        }
        let active = state.active.iter().any(|t| t.ptr_eq(timer));
        let pending = state.to_remove.iter().any(|t| t.ptr_eq(timer));
        if active && !pending {
            state.to_remove.push(timer.clone());
            debug!("timer unscheduled");
        }
    }

    /// Drop every active and pending timer immediately
    pub fn unschedule_all(&self) {
        let mut state = self.state.borrow_mut();
        state.active.clear();
        state.to_add.clear();
        state.to_remove.clear();
        debug!("all timers unscheduled");
    }

    /// Whether the timer fires on the next tick
    pub fn is_scheduled(&self, timer: &Timer) -> bool {
        let state = self.state.borrow();
        let removing = state.to_remove.iter().any(|t| t.ptr_eq(timer));
        let present = state.active.iter().any(|t| t.ptr_eq(timer))
            || state.to_add.iter().any(|t| t.ptr_eq(timer));
        present && !removing
    }

    /// Number of timers that fire on the next tick
    pub fn timer_count(&self) -> usize {
        let state = self.state.borrow();
        state.active.len() + state.to_add.len() - state.to_remove.len()
    }

    /// Advance every timer by `dt` seconds (scaled by the time scale)
    ///
    /// Pending removals are committed first, then pending additions, then
    /// each active timer fires in scheduling order. The first callback
    /// error aborts the rest of the tick.
    pub fn tick(&self, dt: f32) -> Result<()> {
        let (timers, dt) = {
            let mut state = self.state.borrow_mut();
            state.commit_pending();
            (state.active.clone(), dt * state.time_scale)
        };

        trace!(dt, timers = timers.len(), "scheduler tick");
        for timer in &timers {
            timer.fire(dt)?;
        }
        Ok(())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Timer) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        let timer = Timer::new(0.0, move |_| {
            inner.set(inner.get() + 1);
            Ok(())
        });
        (count, timer)
    }

    #[test]
    fn test_schedule_is_idempotent() {
        let scheduler = Scheduler::new();
        let (count, timer) = counter();

        scheduler.schedule(&timer);
        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();
        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();

        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.timer_count(), 1);
    }

    #[test]
    fn test_unschedule_takes_effect_next_tick() {
        let scheduler = Scheduler::new();
        let (count, timer) = counter();

        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();
        scheduler.unschedule(&timer);
        assert!(!scheduler.is_scheduled(&timer));
        scheduler.tick(0.1).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_resurrect_before_commit() {
        let scheduler = Scheduler::new();
        let (count, timer) = counter();

        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();
        scheduler.unschedule(&timer);
        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();

        assert_eq!(count.get(), 2);
        assert!(scheduler.is_scheduled(&timer));
    }

    #[test]
    fn test_unschedule_pending_addition_is_silent() {
        let scheduler = Scheduler::new();
        let (count, timer) = counter();

        scheduler.schedule(&timer);
        scheduler.unschedule(&timer);
        scheduler.tick(0.1).unwrap();

        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_time_scale_applies_to_all_timers() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let timer = Timer::new(0.0, move |dt| {
            log.borrow_mut().push(dt);
            Ok(())
        });

        scheduler.schedule(&timer);
        scheduler.set_time_scale(0.5);
        scheduler.tick(0.5).unwrap();
        scheduler.tick(1.0).unwrap();

        assert_eq!(seen.borrow().as_slice(), &[0.25, 0.5]);
    }

    #[test]
    fn test_schedule_from_callback_waits_for_next_tick() {
        let scheduler = Scheduler::new();
        let (late_count, late) = counter();
        let handle = scheduler.clone();
        let spawner = Timer::new(0.0, move |_| {
            handle.schedule(&late);
            Ok(())
        });

        scheduler.schedule(&spawner);
        scheduler.tick(0.1).unwrap();
        assert_eq!(late_count.get(), 0);

        scheduler.tick(0.1).unwrap();
        assert_eq!(late_count.get(), 1);
    }

    #[test]
    fn test_unschedule_self_from_callback() {
        let scheduler = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Timer>>> = Rc::new(RefCell::new(None));

        let handle = scheduler.clone();
        let inner_count = count.clone();
        let inner_slot = slot.clone();
        let timer = Timer::new(0.0, move |_| {
            inner_count.set(inner_count.get() + 1);
            if let Some(me) = inner_slot.borrow().as_ref() {
                handle.unschedule(me);
            }
            Ok(())
        });
        *slot.borrow_mut() = Some(timer.clone());

        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();
        scheduler.tick(0.1).unwrap();
        scheduler.tick(0.1).unwrap();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unschedule_all() {
        let scheduler = Scheduler::new();
        let (count, timer) = counter();
        let (_, pending) = counter();

        scheduler.schedule(&timer);
        scheduler.tick(0.1).unwrap();
        scheduler.schedule(&pending);
        scheduler.unschedule_all();
        scheduler.tick(0.1).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.timer_count(), 0);
    }
}
