//! Main-loop clock
//!
//! Owns the scheduler and the action manager of one application context
//! and advances both once per frame.

use std::time::Instant;

use tracing::{debug, trace};

use cadence_core::{Result, Scheduler, TargetRef};

use crate::config::ClockConfig;
use crate::manager::{ActionHandle, ActionManager};

/// The clock that ticks all scheduled timers and running actions
pub struct Clock {
    scheduler: Scheduler,
    actions: ActionManager,
    config: ClockConfig,
    last_frame: Instant,
    paused: bool,
    /// Set by `resume` so the paused span is not replayed
    next_delta_zero: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::with_config(ClockConfig::default())
    }

    pub fn with_config(config: ClockConfig) -> Self {
        let scheduler = Scheduler::new();
        scheduler.set_time_scale(config.time_scale);
        let actions = ActionManager::new(&scheduler);
        Self {
            scheduler,
            actions,
            config,
            last_frame: Instant::now(),
            paused: false,
            next_delta_zero: false,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn actions(&self) -> &ActionManager {
        &self.actions
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        debug!(fps, "clock target fps changed");
        self.config.target_fps = fps;
    }

    pub fn set_fixed_step(&mut self, fixed_step: bool) {
        debug!(fixed_step, "clock stepping mode changed");
        self.config.fixed_step = fixed_step;
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.config.time_scale = time_scale;
        self.scheduler.set_time_scale(time_scale);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ignore ticks until `resume`
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!("clock paused");
        }
    }

    /// Accept ticks again; the first one advances by zero
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_delta_zero = true;
            debug!("clock resumed");
        }
    }

    /// Start `action` on `owner` right away
    pub fn run_action(&self, action: &ActionHandle, owner: &TargetRef) -> Result<()> {
        self.actions.add_action(action, owner, false)
    }

    /// Tick from the frame loop
    ///
    /// Measures the wall time since the previous tick, or uses the fixed
    /// frame interval in fixed-step mode.
    pub fn tick(&mut self) -> Result<()> {
        let now = Instant::now();
        let measured = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let dt = if self.config.fixed_step {
            self.config.frame_interval()
        } else {
            measured
        };
        self.advance(dt)
    }

    /// Tick by an externally measured `dt`
    pub fn advance(&mut self, dt: f32) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        let dt = if self.next_delta_zero {
            self.next_delta_zero = false;
            0.0
        } else {
            dt
        };
        trace!(dt, "clock tick");
        self.scheduler.tick(dt)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
