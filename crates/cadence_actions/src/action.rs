//! Actions and their lifecycle
//!
//! An [`Action`] is a reusable descriptor of a timed mutation. It is bound
//! to an owner by [`Action::start`], advanced by [`Action::step`] or
//! [`Action::update`], and released by [`Action::stop`]. The same action
//! can be started again afterwards and replays from the beginning.
//!
//! ```
//! use cadence_actions::{Action, Easing};
//! use cadence_core::Point;
//!
//! let hop = Action::sequence([
//!     Action::move_by(0.5, Point::new(0.0, 40.0)).eased(Easing::ease_out()),
//!     Action::move_by(0.5, Point::new(0.0, -40.0)).eased(Easing::ease_in()),
//! ]);
//! assert_eq!(hop.duration(), 1.0);
//! assert!(hop.reverse().is_some());
//! ```

use std::fmt;
use std::rc::Rc;

use cadence_core::{CadenceError, Color, Point, Result, TargetRef};

use crate::combinator::{Ease, Repeat, RepeatForever, ReverseTime, Sequence, Spawn, Speed};
use crate::easing::Easing;
use crate::leaf::{Bezier, Leaf};

/// Duration substituted for zero-length interval actions
pub const MIN_DURATION: f32 = 1e-8;

/// The shape of an action tree node
#[derive(Clone)]
pub enum ActionNode {
    Primitive(Leaf),
    Sequence(Sequence),
    Spawn(Spawn),
    Repeat(Repeat),
    RepeatForever(RepeatForever),
    Speed(Speed),
    Ease(Ease),
    ReverseTime(ReverseTime),
}

/// A timed mutation of an owner
#[derive(Clone)]
pub struct Action {
    node: ActionNode,
    /// Zero for instant leaves, at least [`MIN_DURATION`] otherwise
    duration: f32,
    elapsed: f32,
    /// Whether an instant leaf already applied its effect this run
    fired: bool,
    run_owner: Option<TargetRef>,
    original_owner: Option<TargetRef>,
}

impl Action {
    fn interval(duration: f32, node: ActionNode) -> Self {
        let duration = if duration > 0.0 {
            duration
        } else {
            MIN_DURATION
        };
        Self {
            node,
            duration,
            elapsed: 0.0,
            fired: false,
            run_owner: None,
            original_owner: None,
        }
    }

    fn leaf(duration: f32, leaf: Leaf) -> Self {
        if leaf.is_instant() {
            let mut action = Self::interval(0.0, ActionNode::Primitive(leaf));
            action.duration = 0.0;
            action
        } else {
            Self::interval(duration, ActionNode::Primitive(leaf))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Interval leaves
    // ─────────────────────────────────────────────────────────────────────────

    /// Does nothing for `duration` seconds
    pub fn delay(duration: f32) -> Self {
        Self::leaf(duration, Leaf::delay())
    }

    pub fn move_to(duration: f32, position: Point) -> Self {
        Self::leaf(duration, Leaf::move_to(position))
    }

    pub fn move_by(duration: f32, delta: Point) -> Self {
        Self::leaf(duration, Leaf::move_by(delta))
    }

    /// Rotate along the shortest arc to `degrees`
    pub fn rotate_to(duration: f32, degrees: f32) -> Self {
        Self::leaf(duration, Leaf::rotate_to(degrees))
    }

    pub fn rotate_by(duration: f32, degrees: f32) -> Self {
        Self::leaf(duration, Leaf::rotate_by(degrees))
    }

    pub fn scale_to(duration: f32, x: f32, y: f32) -> Self {
        Self::leaf(duration, Leaf::scale_to(x, y))
    }

    /// Multiply the owner's scale by the given factors
    pub fn scale_by(duration: f32, x: f32, y: f32) -> Self {
        Self::leaf(duration, Leaf::scale_by(x, y))
    }

    pub fn fade_in(duration: f32) -> Self {
        Self::leaf(duration, Leaf::fade_in())
    }

    pub fn fade_out(duration: f32) -> Self {
        Self::leaf(duration, Leaf::fade_out())
    }

    pub fn fade_to(duration: f32, opacity: f32) -> Self {
        Self::leaf(duration, Leaf::fade_to(opacity))
    }

    pub fn tint_to(duration: f32, color: Color) -> Self {
        Self::leaf(duration, Leaf::tint_to(color))
    }

    /// Add `delta` to every color channel over time
    pub fn tint_by(duration: f32, delta: Color) -> Self {
        Self::leaf(duration, Leaf::tint_by(delta))
    }

    /// Toggle visibility `times` times over the duration
    pub fn blink(duration: f32, times: u32) -> Self {
        Self::leaf(duration, Leaf::blink(times))
    }

    pub fn jump_to(duration: f32, position: Point, height: f32, jumps: u32) -> Self {
        Self::leaf(duration, Leaf::jump_to(position, height, jumps))
    }

    /// Hop `jumps` times while translating by `delta`
    pub fn jump_by(duration: f32, delta: Point, height: f32, jumps: u32) -> Self {
        Self::leaf(duration, Leaf::jump_by(delta, height, jumps))
    }

    /// Follow a curve whose points are absolute positions
    pub fn bezier_to(duration: f32, curve: Bezier) -> Self {
        Self::leaf(duration, Leaf::bezier_to(curve))
    }

    /// Follow a curve whose points are offsets from the start position
    pub fn bezier_by(duration: f32, curve: Bezier) -> Self {
        Self::leaf(duration, Leaf::bezier_by(curve))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Instant leaves
    // ─────────────────────────────────────────────────────────────────────────

    pub fn show() -> Self {
        Self::leaf(0.0, Leaf::show())
    }

    pub fn hide() -> Self {
        Self::leaf(0.0, Leaf::hide())
    }

    pub fn toggle_visibility() -> Self {
        Self::leaf(0.0, Leaf::toggle_visibility())
    }

    pub fn place(position: Point) -> Self {
        Self::leaf(0.0, Leaf::place(position))
    }

    /// Set the owner's rotation outright
    pub fn orient(degrees: f32) -> Self {
        Self::leaf(0.0, Leaf::orient(degrees))
    }

    /// Run a callback once
    pub fn call<F>(callback: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        Self::leaf(0.0, Leaf::call(Rc::new(callback)))
    }

    /// Run a callback once, handing it the owner
    pub fn call_with_owner<F>(callback: F) -> Self
    where
        F: Fn(&TargetRef) -> Result<()> + 'static,
    {
        Self::leaf(0.0, Leaf::call_with_owner(Rc::new(callback)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Combinators
    // ─────────────────────────────────────────────────────────────────────────

    /// Run actions one after another
    pub fn sequence(actions: impl IntoIterator<Item = Action>) -> Self {
        let sequence = Sequence::new(actions);
        Self::interval(sequence.duration(), ActionNode::Sequence(sequence))
    }

    /// Run actions side by side
    pub fn spawn(actions: impl IntoIterator<Item = Action>) -> Self {
        let spawn = Spawn::new(actions);
        Self::interval(spawn.duration(), ActionNode::Spawn(spawn))
    }

    pub fn repeat(action: Action, times: u32) -> Self {
        let duration = action.duration * times as f32;
        Self::interval(duration, ActionNode::Repeat(Repeat::new(action, times)))
    }

    /// Repeat `action` until removed; never done
    pub fn repeat_forever(action: Action) -> Self {
        let duration = action.duration;
        Self::interval(
            duration,
            ActionNode::RepeatForever(RepeatForever::new(action)),
        )
    }

    /// Run `action` `factor` times as fast
    pub fn speed(action: Action, factor: f32) -> Self {
        let speed = Speed::new(action, factor);
        Self::interval(speed.duration(), ActionNode::Speed(speed))
    }

    pub fn ease(action: Action, easing: Easing) -> Self {
        let duration = action.duration;
        Self::interval(duration, ActionNode::Ease(Ease::new(action, easing)))
    }

    /// Play `action` backwards in time
    pub fn reverse_time(action: Action) -> Self {
        let duration = action.duration;
        Self::interval(duration, ActionNode::ReverseTime(ReverseTime::new(action)))
    }

    /// Builder: wrap in an easing curve
    pub fn eased(self, easing: Easing) -> Self {
        Self::ease(self, easing)
    }

    /// Builder: repeat `times` times
    pub fn repeated(self, times: u32) -> Self {
        Self::repeat(self, times)
    }

    /// Builder: repeat until removed
    pub fn forever(self) -> Self {
        Self::repeat_forever(self)
    }

    /// Builder: scale the speed by `factor`
    pub fn with_speed(self, factor: f32) -> Self {
        Self::speed(self, factor)
    }

    /// Builder: play backwards in time
    pub fn time_reversed(self) -> Self {
        Self::reverse_time(self)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Action name used in logs and errors
    pub fn name(&self) -> &'static str {
        match &self.node {
            ActionNode::Primitive(leaf) => leaf.name(),
            ActionNode::Sequence(_) => "Sequence",
            ActionNode::Spawn(_) => "Spawn",
            ActionNode::Repeat(_) => "Repeat",
            ActionNode::RepeatForever(_) => "RepeatForever",
            ActionNode::Speed(_) => "Speed",
            ActionNode::Ease(_) => "Ease",
            ActionNode::ReverseTime(_) => "ReverseTime",
        }
    }

    pub fn node(&self) -> &ActionNode {
        &self.node
    }

    /// Declared duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Time accumulated by `step` since the last start
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether this is a zero-duration leaf
    pub fn is_instant(&self) -> bool {
        matches!(&self.node, ActionNode::Primitive(leaf) if leaf.is_instant())
    }

    /// Whether the action is bound to an owner
    pub fn is_running(&self) -> bool {
        self.run_owner.is_some()
    }

    /// The owner the action was last started with; kept after stop
    pub fn original_owner(&self) -> Option<&TargetRef> {
        self.original_owner.as_ref()
    }

    /// The owner the action is currently bound to
    pub fn run_owner(&self) -> Option<&TargetRef> {
        self.run_owner.as_ref()
    }

    /// Change the factor of a speed action, returns `false` for any other
    pub fn set_speed(&mut self, factor: f32) -> bool {
        let ActionNode::Speed(speed) = &mut self.node else {
            return false;
        };
        speed.set_factor(factor);
        self.duration = speed.duration().max(MIN_DURATION);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Bind to `owner` and capture the values the action starts from
    pub fn start(&mut self, owner: &TargetRef) -> Result<()> {
        self.original_owner = Some(owner.clone());
        self.run_owner = Some(owner.clone());
        self.elapsed = 0.0;
        self.fired = false;
        match &mut self.node {
            ActionNode::Primitive(leaf) => leaf.start(owner),
            ActionNode::Sequence(sequence) => {
                sequence.start();
                Ok(())
            }
            ActionNode::Spawn(spawn) => spawn.start(owner),
            ActionNode::Repeat(repeat) => repeat.start(owner),
            ActionNode::RepeatForever(forever) => forever.start(owner),
            ActionNode::Speed(speed) => speed.start(owner),
            ActionNode::Ease(ease) => ease.start(owner),
            ActionNode::ReverseTime(reverse) => reverse.start(owner),
        }
    }

    /// Advance by `dt` seconds
    ///
    /// Interval actions turn accumulated time into progress clamped to 1.0.
    /// Instant leaves ignore `dt` and apply their effect once per start.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        if self.is_instant() {
            if self.fired {
                return Ok(());
            }
            self.fired = true;
            return self.update(1.0);
        }

        self.elapsed += dt;
        if let ActionNode::RepeatForever(forever) = &mut self.node {
            let owner = self.run_owner.clone().ok_or(CadenceError::NotRunning {
                action: "RepeatForever",
            })?;
            return forever.step(&owner, dt);
        }
        if let ActionNode::Speed(speed) = &mut self.node {
            if self.run_owner.is_none() {
                return Err(CadenceError::NotRunning { action: "Speed" });
            }
            return speed.step(dt);
        }

        let t = (self.elapsed / self.duration).min(1.0);
        self.update(t)
    }

    /// Apply progress `t` directly
    pub fn update(&mut self, t: f32) -> Result<()> {
        let owner = self
            .run_owner
            .clone()
            .ok_or(CadenceError::NotRunning { action: self.name() })?;
        match &mut self.node {
            ActionNode::Primitive(leaf) => leaf.update(&owner, t),
            ActionNode::Sequence(sequence) => sequence.update(&owner, t),
            ActionNode::Spawn(spawn) => spawn.update(t),
            ActionNode::Repeat(repeat) => repeat.update(&owner, t),
            ActionNode::RepeatForever(forever) => forever.update(t),
            ActionNode::Speed(speed) => speed.update(t),
            ActionNode::Ease(ease) => ease.update(t),
            ActionNode::ReverseTime(reverse) => reverse.update(t),
        }
    }

    /// Release the run owner; the original owner is kept
    pub fn stop(&mut self) {
        self.run_owner = None;
        match &mut self.node {
            ActionNode::Primitive(_) => {}
            ActionNode::Sequence(sequence) => sequence.stop(),
            ActionNode::Spawn(spawn) => spawn.stop(),
            ActionNode::Repeat(repeat) => repeat.stop(),
            ActionNode::RepeatForever(forever) => forever.stop(),
            ActionNode::Speed(speed) => speed.stop(),
            ActionNode::Ease(ease) => ease.stop(),
            ActionNode::ReverseTime(reverse) => reverse.stop(),
        }
    }

    pub fn is_done(&self) -> bool {
        match &self.node {
            ActionNode::Primitive(leaf) if leaf.is_instant() => true,
            ActionNode::Repeat(repeat) => repeat.is_done(),
            ActionNode::RepeatForever(_) => false,
            ActionNode::Speed(speed) => speed.is_done(),
            _ => self.elapsed >= self.duration,
        }
    }

    /// A fresh action undoing this one, `None` when it has no reverse
    pub fn reverse(&self) -> Option<Action> {
        match &self.node {
            ActionNode::Primitive(leaf) => Some(Self::leaf(self.duration, leaf.reverse()?)),
            ActionNode::Sequence(sequence) => Some(sequence.reverse()),
            ActionNode::Spawn(spawn) => spawn.reverse(),
            ActionNode::Repeat(repeat) => repeat.reverse(),
            ActionNode::RepeatForever(forever) => forever.reverse(),
            ActionNode::Speed(speed) => speed.reverse(),
            ActionNode::Ease(ease) => ease.reverse(),
            ActionNode::ReverseTime(reverse) => Some(reverse.reverse()),
        }
    }

    /// A copy with all run state cleared
    pub(crate) fn detached(&self) -> Action {
        let mut copy = self.clone();
        copy.reset();
        copy
    }

    pub(crate) fn reset(&mut self) {
        self.elapsed = 0.0;
        self.fired = false;
        self.run_owner = None;
        self.original_owner = None;
        match &mut self.node {
            ActionNode::Primitive(_) => {}
            ActionNode::Sequence(sequence) => sequence.reset(),
            ActionNode::Spawn(spawn) => spawn.reset(),
            ActionNode::Repeat(repeat) => repeat.reset(),
            ActionNode::RepeatForever(forever) => forever.reset(),
            ActionNode::Speed(speed) => speed.reset(),
            ActionNode::Ease(ease) => ease.reset(),
            ActionNode::ReverseTime(reverse) => reverse.reset(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name())
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
