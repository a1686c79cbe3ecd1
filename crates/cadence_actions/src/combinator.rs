//! Combinators: actions defined in terms of child actions
//!
//! Each combinator owns its children outright. A child is started with the
//! combinator's owner and only ever driven through its parent, so the
//! parent decides when a child starts, stops and restarts.

use smallvec::SmallVec;

use cadence_core::{Result, TargetRef};

use crate::action::Action;
use crate::easing::Easing;

/// Local progress within this distance of 1.0 counts as complete
const SNAP_EPSILON: f32 = 1e-7;

/// Children live on the heap; `Action` nests these combinators by value
type Children = Vec<Action>;

/// Fire a zero-duration child: start, apply once, stop
fn fire_instant(action: &mut Action, owner: &TargetRef) -> Result<()> {
    action.start(owner)?;
    action.update(1.0)?;
    action.stop();
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence
// ─────────────────────────────────────────────────────────────────────────────

/// Runs children one after another
///
/// Every child owns a slice of the sequence's progress proportional to its
/// duration. Zero-duration children take no slice; they fire together with
/// the next interval child.
#[derive(Clone)]
pub struct Sequence {
    children: Children,
    /// `child.duration / total` per child
    fractions: SmallVec<[f32; 4]>,
    total: f32,
    cursor: usize,
}

impl Sequence {
    pub(crate) fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        let children: Children = actions.into_iter().collect();
        let total: f32 = children.iter().map(Action::duration).sum();
        let fractions = children
            .iter()
            .map(|child| {
                if total > 0.0 {
                    child.duration() / total
                } else {
                    0.0
                }
            })
            .collect();
        Self {
            children,
            fractions,
            total,
            cursor: 0,
        }
    }

    pub fn children(&self) -> &[Action] {
        &self.children
    }

    /// Sum of the children's durations
    pub fn duration(&self) -> f32 {
        self.total
    }

    /// Index of the child currently being driven
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn start(&mut self) {
        for child in &mut self.children {
            child.stop();
        }
        self.cursor = 0;
    }

    pub(crate) fn stop(&mut self) {
        for child in &mut self.children {
            child.stop();
        }
    }

    pub(crate) fn reset(&mut self) {
        self.cursor = 0;
        for child in &mut self.children {
            child.reset();
        }
    }

    fn fire_ready_instants(&mut self, owner: &TargetRef) -> Result<()> {
        while let Some(child) = self.children.get_mut(self.cursor) {
            if !child.is_instant() {
                break;
            }
            fire_instant(child, owner)?;
            self.cursor += 1;
        }
        Ok(())
    }

    pub(crate) fn update(&mut self, owner: &TargetRef, t: f32) -> Result<()> {
        loop {
            self.fire_ready_instants(owner)?;
            let Some(child) = self.children.get_mut(self.cursor) else {
                return Ok(());
            };

            let offset: f32 = self.fractions[..self.cursor].iter().sum();
            let fraction = self.fractions[self.cursor];
            if !child.is_running() {
                child.start(owner)?;
            }

            let mut local = if fraction > 0.0 {
                ((t - offset) / fraction).max(0.0)
            } else {
                1.0
            };
            if local >= 1.0 || (local - 1.0).abs() <= SNAP_EPSILON {
                local = 1.0;
            }
            child.update(local)?;
            if local < 1.0 {
                return Ok(());
            }

            child.stop();
            self.cursor += 1;

            let rest = &self.children[self.cursor..];
            if rest.iter().all(Action::is_instant) {
                return self.fire_ready_instants(owner);
            }

            // Progress past this child's end belongs to the next one
            let end = offset + fraction;
            if t < 1.0 && t <= end + SNAP_EPSILON {
                return Ok(());
            }
        }
    }

    /// The children in reverse order, each left as it is
    pub(crate) fn reverse(&self) -> Action {
        Action::sequence(self.children.iter().rev().map(Action::detached))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Spawn
// ─────────────────────────────────────────────────────────────────────────────

/// Runs children side by side; every child finishes with the longest one
#[derive(Clone)]
pub struct Spawn {
    /// Children padded with a trailing delay up to the longest duration
    lanes: Children,
    /// Children as given, kept for `reverse`
    sources: Children,
    longest: f32,
}

impl Spawn {
    pub(crate) fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        let sources: Children = actions.into_iter().collect();
        let longest = sources.iter().map(Action::duration).fold(0.0, f32::max);
        let lanes = sources
            .iter()
            .map(|source| {
                let duration = source.duration();
                if duration < longest {
                    Action::sequence([source.detached(), Action::delay(longest - duration)])
                } else {
                    source.detached()
                }
            })
            .collect();
        Self {
            lanes,
            sources,
            longest,
        }
    }

    /// The children as given, without padding
    pub fn children(&self) -> &[Action] {
        &self.sources
    }

    /// Duration of the longest child
    pub fn duration(&self) -> f32 {
        self.longest
    }

    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        for lane in &mut self.lanes {
            lane.start(owner)?;
        }
        Ok(())
    }

    pub(crate) fn stop(&mut self) {
        for lane in &mut self.lanes {
            lane.stop();
        }
    }

    pub(crate) fn reset(&mut self) {
        for lane in self.lanes.iter_mut().chain(self.sources.iter_mut()) {
            lane.reset();
        }
    }

    pub(crate) fn update(&mut self, t: f32) -> Result<()> {
        for lane in &mut self.lanes {
            lane.update(t)?;
        }
        Ok(())
    }

    pub(crate) fn reverse(&self) -> Option<Action> {
        let reversed = self
            .sources
            .iter()
            .map(Action::reverse)
            .collect::<Option<Vec<_>>>()?;
        Some(Action::spawn(reversed))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repetition
// ─────────────────────────────────────────────────────────────────────────────

/// Runs a child a fixed number of times back to back
#[derive(Clone)]
pub struct Repeat {
    child: Box<Action>,
    times: u32,
    completed: u32,
}

impl Repeat {
    pub(crate) fn new(child: Action, times: u32) -> Self {
        Self {
            child: Box::new(child),
            times,
            completed: 0,
        }
    }

    pub fn child(&self) -> &Action {
        &self.child
    }

    pub fn times(&self) -> u32 {
        self.times
    }

    /// Repetitions finished since the last start
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub(crate) fn is_done(&self) -> bool {
        self.completed == self.times
    }

    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        self.completed = 0;
        self.child.start(owner)
    }

    pub(crate) fn stop(&mut self) {
        self.child.stop();
    }

    pub(crate) fn reset(&mut self) {
        self.completed = 0;
        self.child.reset();
    }

    pub(crate) fn update(&mut self, owner: &TargetRef, t: f32) -> Result<()> {
        if self.times == 0 || self.completed >= self.times {
            return Ok(());
        }

        let scaled = t * self.times as f32;
        let instant = self.child.is_instant();
        let mut crossed = false;
        while self.completed + 1 < self.times && scaled >= (self.completed + 1) as f32 {
            self.child.update(1.0)?;
            self.completed += 1;
            self.child.stop();
            self.child.start(owner)?;
            if !instant {
                self.child.update(0.0)?;
            }
            crossed = true;
        }

        if t >= 1.0 {
            self.child.update(1.0)?;
            self.completed = self.times;
        } else if !instant {
            let local = (scaled - self.completed as f32).clamp(0.0, 1.0);
            if !crossed || local > 0.0 {
                self.child.update(local)?;
            }
        }
        Ok(())
    }

    pub(crate) fn reverse(&self) -> Option<Action> {
        Some(Action::repeat(self.child.reverse()?, self.times))
    }
}

/// Restarts its child every time the child finishes, without end
#[derive(Clone)]
pub struct RepeatForever {
    child: Box<Action>,
    restarts: u32,
}

impl RepeatForever {
    pub(crate) fn new(child: Action) -> Self {
        Self {
            child: Box::new(child),
            restarts: 0,
        }
    }

    pub fn child(&self) -> &Action {
        &self.child
    }

    /// Times the child was restarted since the last start
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        self.restarts = 0;
        self.child.start(owner)
    }

    pub(crate) fn stop(&mut self) {
        self.child.stop();
    }

    pub(crate) fn reset(&mut self) {
        self.restarts = 0;
        self.child.reset();
    }

    /// Step the child with the full `dt`; restart it once it is done
    pub(crate) fn step(&mut self, owner: &TargetRef, dt: f32) -> Result<()> {
        self.child.step(dt)?;
        if self.child.is_done() {
            self.child.stop();
            self.child.start(owner)?;
            self.restarts += 1;
        }
        Ok(())
    }

    pub(crate) fn update(&mut self, t: f32) -> Result<()> {
        self.child.update(t)
    }

    pub(crate) fn reverse(&self) -> Option<Action> {
        Some(Action::repeat_forever(self.child.reverse()?))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Time remapping
// ─────────────────────────────────────────────────────────────────────────────

/// Runs its child faster or slower
#[derive(Clone)]
pub struct Speed {
    child: Box<Action>,
    factor: f32,
}

impl Speed {
    pub(crate) fn new(child: Action, factor: f32) -> Self {
        Self {
            child: Box::new(child),
            factor,
        }
    }

    pub fn child(&self) -> &Action {
        &self.child
    }

    /// Multiplier applied to every `dt` before it reaches the child
    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub(crate) fn set_factor(&mut self, factor: f32) {
        self.factor = factor;
    }

    /// Wall-clock duration of the child at this speed
    pub fn duration(&self) -> f32 {
        self.child.duration() / self.factor
    }

    pub(crate) fn is_done(&self) -> bool {
        self.child.is_done()
    }

    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        self.child.start(owner)
    }

    pub(crate) fn stop(&mut self) {
        self.child.stop();
    }

    pub(crate) fn reset(&mut self) {
        self.child.reset();
    }

    pub(crate) fn step(&mut self, dt: f32) -> Result<()> {
        self.child.step(dt * self.factor)
    }

    pub(crate) fn update(&mut self, t: f32) -> Result<()> {
        self.child.update(t)
    }

    /// The factor is kept, not inverted
    pub(crate) fn reverse(&self) -> Option<Action> {
        Some(Action::speed(self.child.reverse()?, self.factor))
    }
}

/// Remaps its child's progress through an easing curve
#[derive(Clone)]
pub struct Ease {
    child: Box<Action>,
    easing: Easing,
}

impl Ease {
    pub(crate) fn new(child: Action, easing: Easing) -> Self {
        Self {
            child: Box::new(child),
            easing,
        }
    }

    pub fn child(&self) -> &Action {
        &self.child
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        self.child.start(owner)
    }

    pub(crate) fn stop(&mut self) {
        self.child.stop();
    }

    pub(crate) fn reset(&mut self) {
        self.child.reset();
    }

    pub(crate) fn update(&mut self, t: f32) -> Result<()> {
        self.child.update(self.easing.apply(t))
    }

    pub(crate) fn reverse(&self) -> Option<Action> {
        Some(Action::ease(self.child.reverse()?, self.easing.reversed()?))
    }
}

/// Plays its child backwards in time
#[derive(Clone)]
pub struct ReverseTime {
    child: Box<Action>,
}

impl ReverseTime {
    pub(crate) fn new(child: Action) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn child(&self) -> &Action {
        &self.child
    }

    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        self.child.start(owner)
    }

    pub(crate) fn stop(&mut self) {
        self.child.stop();
    }

    pub(crate) fn reset(&mut self) {
        self.child.reset();
    }

    pub(crate) fn update(&mut self, t: f32) -> Result<()> {
        self.child.update(1.0 - t)
    }

    pub(crate) fn reverse(&self) -> Action {
        self.child.detached()
    }
}
