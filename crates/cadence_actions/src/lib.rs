//! Cadence Action Engine
//!
//! Composable, reusable descriptions of timed mutations:
//!
//! - **Leaves**: move, rotate, scale, fade, tint, blink, jump and Bezier
//!   actions, plus instant show/hide/place/call actions
//! - **Combinators**: sequences, spawns, repeats, speed changes, easing
//!   and time reversal, nested to any depth
//! - **ActionManager**: runs actions on their owners from the scheduler
//! - **Clock**: drives the scheduler once per frame
//!
//! # Example
//!
//! ```rust
//! use cadence_actions::{Action, ActionHandle, Clock, Easing};
//! use cadence_core::{ActionTarget, Point, Positionable, TargetRef};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Ball {
//!     position: Point,
//! }
//!
//! impl Positionable for Ball {
//!     fn position(&self) -> Point {
//!         self.position
//!     }
//!
//!     fn set_position(&mut self, position: Point) {
//!         self.position = position;
//!     }
//! }
//!
//! impl ActionTarget for Ball {
//!     fn as_positionable(&mut self) -> Option<&mut dyn Positionable> {
//!         Some(self)
//!     }
//! }
//!
//! let ball = Rc::new(RefCell::new(Ball::default()));
//! let owner = TargetRef::from(ball.clone());
//!
//! let mut clock = Clock::new();
//! let slide = ActionHandle::new(
//!     Action::move_by(1.0, Point::new(100.0, 0.0)).eased(Easing::ease_in_out()),
//! );
//! clock.run_action(&slide, &owner).unwrap();
//!
//! clock.advance(0.5).unwrap();
//! assert_eq!(ball.borrow().position, Point::new(50.0, 0.0));
//! clock.advance(0.5).unwrap();
//! assert_eq!(ball.borrow().position, Point::new(100.0, 0.0));
//! assert!(clock.actions().is_empty());
//! ```

pub mod action;
pub mod clock;
pub mod combinator;
pub mod config;
pub mod easing;
pub mod leaf;
pub mod manager;
pub mod path;

pub use action::{Action, ActionNode, MIN_DURATION};
pub use clock::Clock;
pub use combinator::{Ease, Repeat, RepeatForever, ReverseTime, Sequence, Spawn, Speed};
pub use config::{ClockConfig, DEFAULT_TARGET_FPS};
pub use easing::{Easing, BACK_OVERSHOOT, DEFAULT_EASE_RATE, DEFAULT_ELASTIC_PERIOD};
pub use leaf::{Bezier, Callback, Leaf, OwnerCallback};
pub use manager::{ActionHandle, ActionManager};
pub use path::{move_along_path, PathOptions, DEFAULT_MAX_ROTATION_DURATION};
