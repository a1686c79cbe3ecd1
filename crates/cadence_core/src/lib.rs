//! Cadence Core Runtime
//!
//! The foundation the action engine runs on:
//!
//! - **Timers**: periodic callbacks with a deterministic first fire
//! - **Scheduler**: a single synchronous clock that fires timers once per tick
//!   and tolerates re-entrant schedule/unschedule calls
//! - **Capabilities**: per-property traits an action owner opts into
//! - **Geometry**: points, colors and paths that actions interpolate
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Scheduler, Timer};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scheduler = Scheduler::new();
//! let fired = Rc::new(Cell::new(0));
//!
//! let counter = fired.clone();
//! let timer = Timer::new(0.5, move |_| {
//!     counter.set(counter.get() + 1);
//!     Ok(())
//! });
//! scheduler.schedule(&timer);
//!
//! // The first tick anchors the timer and fires it immediately
//! scheduler.tick(0.25).unwrap();
//! scheduler.tick(0.25).unwrap();
//! scheduler.tick(0.25).unwrap();
//! assert_eq!(fired.get(), 2);
//! ```

pub mod error;
pub mod geometry;
pub mod scheduler;
pub mod target;
pub mod timer;

pub use error::{CadenceError, Result};
pub use geometry::{Color, Path, PathKind, Point};
pub use scheduler::Scheduler;
pub use target::{
    ActionTarget, Capability, OpacityBearing, Positionable, Rotatable, Scalable, TargetRef,
    Tintable, VisibilityToggleable,
};
pub use timer::{Timer, TimerCallback};
