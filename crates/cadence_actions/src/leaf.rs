//! Leaf actions
//!
//! Leaves are the only actions that touch an owner directly. Interval
//! leaves capture the owner's current value on start and interpolate from
//! it; instant leaves apply their effect once and are done.

use std::fmt;
use std::rc::Rc;

use cadence_core::geometry::normalize_delta;
use cadence_core::{Color, Point, Result, TargetRef};

/// Callback run by a call-function action
pub type Callback = Rc<dyn Fn() -> Result<()>>;

/// Callback run by a call-function action, given the action's owner
pub type OwnerCallback = Rc<dyn Fn(&TargetRef) -> Result<()>>;

/// Cubic Bezier curve starting at the origin
///
/// For relative Bezier actions all three points are offsets from the
/// owner's start position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bezier {
    pub control_1: Point,
    pub control_2: Point,
    pub end: Point,
}

impl Bezier {
    pub const fn new(control_1: Point, control_2: Point, end: Point) -> Self {
        Self {
            control_1,
            control_2,
            end,
        }
    }

    /// Point on the curve at progress `t`
    pub fn at(&self, t: f32) -> Point {
        Point::new(
            bezier_at(0.0, self.control_1.x, self.control_2.x, self.end.x, t),
            bezier_at(0.0, self.control_1.y, self.control_2.y, self.end.y, t),
        )
    }

    /// The same curve walked from its end back to the origin
    pub fn reversed(&self) -> Bezier {
        Bezier::new(
            self.control_2 - self.end,
            self.control_1 - self.end,
            -self.end,
        )
    }

    /// Every point shifted by `-origin`
    fn relative_to(&self, origin: Point) -> Bezier {
        Bezier::new(
            self.control_1 - origin,
            self.control_2 - origin,
            self.end - origin,
        )
    }
}

fn bezier_at(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * a + 3.0 * t * u * u * b + 3.0 * t * t * u * c + t * t * t * d
}

/// Parabolic hop offset for a jump after progress `t`
fn hop(height: f32, jumps: u32, t: f32) -> f32 {
    let frac = (t * jumps as f32) % 1.0;
    height * 4.0 * frac * (1.0 - frac)
}

/// A leaf action and the values it captured on start
#[derive(Clone)]
pub struct Leaf(LeafKind);

#[derive(Clone)]
enum LeafKind {
    Delay,
    MoveBy {
        delta: Point,
        start: Point,
    },
    MoveTo {
        end: Point,
        start: Point,
    },
    RotateBy {
        angle: f32,
        start: f32,
    },
    RotateTo {
        target: f32,
        start: f32,
        delta: f32,
    },
    ScaleBy {
        factor: (f32, f32),
        start: (f32, f32),
    },
    ScaleTo {
        end: (f32, f32),
        start: (f32, f32),
    },
    FadeIn {
        start: f32,
    },
    FadeOut {
        start: f32,
    },
    FadeTo {
        end: f32,
        start: f32,
    },
    TintBy {
        delta: Color,
        start: Color,
    },
    TintTo {
        end: Color,
        start: Color,
    },
    Blink {
        times: u32,
    },
    JumpBy {
        delta: Point,
        height: f32,
        jumps: u32,
        start: Point,
    },
    JumpTo {
        end: Point,
        height: f32,
        jumps: u32,
        start: Point,
    },
    BezierBy {
        curve: Bezier,
        start: Point,
    },
    BezierTo {
        curve: Bezier,
        start: Point,
    },
    Show,
    Hide,
    ToggleVisibility,
    Place(Point),
    Orient(f32),
    CallFunc(Callback),
    CallFuncWithOwner(OwnerCallback),
}

impl Leaf {
    pub(crate) fn delay() -> Self {
        Leaf(LeafKind::Delay)
    }

    pub(crate) fn move_by(delta: Point) -> Self {
        Leaf(LeafKind::MoveBy {
            delta,
            start: Point::ZERO,
        })
    }

    pub(crate) fn move_to(end: Point) -> Self {
        Leaf(LeafKind::MoveTo {
            end,
            start: Point::ZERO,
        })
    }

    pub(crate) fn rotate_by(angle: f32) -> Self {
        Leaf(LeafKind::RotateBy { angle, start: 0.0 })
    }

    pub(crate) fn rotate_to(target: f32) -> Self {
        Leaf(LeafKind::RotateTo {
            target,
            start: 0.0,
            delta: 0.0,
        })
    }

    pub(crate) fn scale_by(x: f32, y: f32) -> Self {
        Leaf(LeafKind::ScaleBy {
            factor: (x, y),
            start: (1.0, 1.0),
        })
    }

    pub(crate) fn scale_to(x: f32, y: f32) -> Self {
        Leaf(LeafKind::ScaleTo {
            end: (x, y),
            start: (1.0, 1.0),
        })
    }

    pub(crate) fn fade_in() -> Self {
        Leaf(LeafKind::FadeIn { start: 0.0 })
    }

    pub(crate) fn fade_out() -> Self {
        Leaf(LeafKind::FadeOut { start: 1.0 })
    }

    pub(crate) fn fade_to(end: f32) -> Self {
        Leaf(LeafKind::FadeTo { end, start: 1.0 })
    }

    pub(crate) fn tint_by(delta: Color) -> Self {
        Leaf(LeafKind::TintBy {
            delta,
            start: Color::WHITE,
        })
    }

    pub(crate) fn tint_to(end: Color) -> Self {
        Leaf(LeafKind::TintTo {
            end,
            start: Color::WHITE,
        })
    }

    pub(crate) fn blink(times: u32) -> Self {
        Leaf(LeafKind::Blink { times })
    }

    pub(crate) fn jump_by(delta: Point, height: f32, jumps: u32) -> Self {
        Leaf(LeafKind::JumpBy {
            delta,
            height,
            jumps,
            start: Point::ZERO,
        })
    }

    pub(crate) fn jump_to(end: Point, height: f32, jumps: u32) -> Self {
        Leaf(LeafKind::JumpTo {
            end,
            height,
            jumps,
            start: Point::ZERO,
        })
    }

    pub(crate) fn bezier_by(curve: Bezier) -> Self {
        Leaf(LeafKind::BezierBy {
            curve,
            start: Point::ZERO,
        })
    }

    pub(crate) fn bezier_to(curve: Bezier) -> Self {
        Leaf(LeafKind::BezierTo {
            curve,
            start: Point::ZERO,
        })
    }

    pub(crate) fn show() -> Self {
        Leaf(LeafKind::Show)
    }

    pub(crate) fn hide() -> Self {
        Leaf(LeafKind::Hide)
    }

    pub(crate) fn toggle_visibility() -> Self {
        Leaf(LeafKind::ToggleVisibility)
    }

    pub(crate) fn place(position: Point) -> Self {
        Leaf(LeafKind::Place(position))
    }

    pub(crate) fn orient(degrees: f32) -> Self {
        Leaf(LeafKind::Orient(degrees))
    }

    pub(crate) fn call(callback: Callback) -> Self {
        Leaf(LeafKind::CallFunc(callback))
    }

    pub(crate) fn call_with_owner(callback: OwnerCallback) -> Self {
        Leaf(LeafKind::CallFuncWithOwner(callback))
    }

    /// Action name used in logs and errors
    pub fn name(&self) -> &'static str {
        match &self.0 {
            LeafKind::Delay => "DelayTime",
            LeafKind::MoveBy { .. } => "MoveBy",
            LeafKind::MoveTo { .. } => "MoveTo",
            LeafKind::RotateBy { .. } => "RotateBy",
            LeafKind::RotateTo { .. } => "RotateTo",
            LeafKind::ScaleBy { .. } => "ScaleBy",
            LeafKind::ScaleTo { .. } => "ScaleTo",
            LeafKind::FadeIn { .. } => "FadeIn",
            LeafKind::FadeOut { .. } => "FadeOut",
            LeafKind::FadeTo { .. } => "FadeTo",
            LeafKind::TintBy { .. } => "TintBy",
            LeafKind::TintTo { .. } => "TintTo",
            LeafKind::Blink { .. } => "Blink",
            LeafKind::JumpBy { .. } => "JumpBy",
            LeafKind::JumpTo { .. } => "JumpTo",
            LeafKind::BezierBy { .. } => "BezierBy",
            LeafKind::BezierTo { .. } => "BezierTo",
            LeafKind::Show => "Show",
            LeafKind::Hide => "Hide",
            LeafKind::ToggleVisibility => "ToggleVisibility",
            LeafKind::Place(_) => "Place",
            LeafKind::Orient(_) => "Orient",
            LeafKind::CallFunc(_) => "CallFunc",
            LeafKind::CallFuncWithOwner(_) => "CallFuncWithOwner",
        }
    }

    /// Whether the leaf has zero duration and applies its effect at once
    pub fn is_instant(&self) -> bool {
        matches!(
            self.0,
            LeafKind::Show
                | LeafKind::Hide
                | LeafKind::ToggleVisibility
                | LeafKind::Place(_)
                | LeafKind::Orient(_)
                | LeafKind::CallFunc(_)
                | LeafKind::CallFuncWithOwner(_)
        )
    }

    /// Capture the owner values the leaf interpolates from
    pub(crate) fn start(&mut self, owner: &TargetRef) -> Result<()> {
        let name = self.name();
        match &mut self.0 {
            LeafKind::MoveBy { start, .. }
            | LeafKind::MoveTo { start, .. }
            | LeafKind::JumpBy { start, .. }
            | LeafKind::JumpTo { start, .. }
            | LeafKind::BezierBy { start, .. }
            | LeafKind::BezierTo { start, .. } => {
                *start = owner.with_position(name, |p| p.position())?;
            }
            LeafKind::RotateBy { start, .. } => {
                *start = owner.with_rotation(name, |r| r.rotation())?;
            }
            LeafKind::RotateTo {
                target,
                start,
                delta,
            } => {
                *start = owner.with_rotation(name, |r| r.rotation())? % 360.0;
                *delta = normalize_delta(*target - *start);
            }
            LeafKind::ScaleBy { start, .. } | LeafKind::ScaleTo { start, .. } => {
                *start = owner.with_scale(name, |s| (s.scale_x(), s.scale_y()))?;
            }
            LeafKind::FadeIn { start }
            | LeafKind::FadeOut { start }
            | LeafKind::FadeTo { start, .. } => {
                *start = owner.with_opacity(name, |o| o.opacity())?;
            }
            LeafKind::TintBy { start, .. } | LeafKind::TintTo { start, .. } => {
                *start = owner.with_tint(name, |c| c.color())?;
            }
            LeafKind::Delay
            | LeafKind::Blink { .. }
            | LeafKind::Show
            | LeafKind::Hide
            | LeafKind::ToggleVisibility
            | LeafKind::Place(_)
            | LeafKind::Orient(_)
            | LeafKind::CallFunc(_)
            | LeafKind::CallFuncWithOwner(_) => {}
        }
        Ok(())
    }

    /// Apply progress `t`; instants apply their effect on every call
    pub(crate) fn update(&self, owner: &TargetRef, t: f32) -> Result<()> {
        let name = self.name();
        match &self.0 {
            LeafKind::Delay => Ok(()),
            LeafKind::MoveBy { delta, start } => {
                owner.with_position(name, |p| p.set_position(*start + *delta * t))
            }
            LeafKind::MoveTo { end, start } => {
                owner.with_position(name, |p| p.set_position(start.lerp(*end, t)))
            }
            LeafKind::RotateBy { angle, start } => {
                owner.with_rotation(name, |r| r.set_rotation(start + angle * t))
            }
            LeafKind::RotateTo { start, delta, .. } => {
                owner.with_rotation(name, |r| r.set_rotation(start + delta * t))
            }
            LeafKind::ScaleBy { factor, start } => owner.with_scale(name, |s| {
                s.set_scale_x(start.0 + start.0 * (factor.0 - 1.0) * t);
                s.set_scale_y(start.1 + start.1 * (factor.1 - 1.0) * t);
            }),
            LeafKind::ScaleTo { end, start } => owner.with_scale(name, |s| {
                s.set_scale_x(start.0 + (end.0 - start.0) * t);
                s.set_scale_y(start.1 + (end.1 - start.1) * t);
            }),
            LeafKind::FadeIn { start } => {
                owner.with_opacity(name, |o| o.set_opacity(start + (1.0 - start) * t))
            }
            LeafKind::FadeOut { start } => {
                owner.with_opacity(name, |o| o.set_opacity(start - start * t))
            }
            LeafKind::FadeTo { end, start } => {
                owner.with_opacity(name, |o| o.set_opacity(start + (end - start) * t))
            }
            LeafKind::TintBy { delta, start } => {
                owner.with_tint(name, |c| c.set_color(start.offset(*delta, t)))
            }
            LeafKind::TintTo { end, start } => {
                owner.with_tint(name, |c| c.set_color(start.lerp(*end, t)))
            }
            LeafKind::Blink { times } => {
                if *times == 0 {
                    return Ok(());
                }
                let slice = 1.0 / *times as f32;
                let visible = t % slice > slice / 2.0;
                owner.with_visibility(name, |v| v.set_visible(visible))
            }
            LeafKind::JumpBy {
                delta,
                height,
                jumps,
                start,
            } => {
                let offset = Point::new(delta.x * t, delta.y * t + hop(*height, *jumps, t));
                owner.with_position(name, |p| p.set_position(*start + offset))
            }
            LeafKind::JumpTo {
                end,
                height,
                jumps,
                start,
            } => {
                let delta = *end - *start;
                let offset = Point::new(delta.x * t, delta.y * t + hop(*height, *jumps, t));
                owner.with_position(name, |p| p.set_position(*start + offset))
            }
            LeafKind::BezierBy { curve, start } => {
                owner.with_position(name, |p| p.set_position(*start + curve.at(t)))
            }
            LeafKind::BezierTo { curve, start } => {
                let relative = curve.relative_to(*start);
                owner.with_position(name, |p| p.set_position(*start + relative.at(t)))
            }
            LeafKind::Show => owner.with_visibility(name, |v| v.set_visible(true)),
            LeafKind::Hide => owner.with_visibility(name, |v| v.set_visible(false)),
            LeafKind::ToggleVisibility => {
                owner.with_visibility(name, |v| v.set_visible(!v.is_visible()))
            }
            LeafKind::Place(position) => owner.with_position(name, |p| p.set_position(*position)),
            LeafKind::Orient(degrees) => owner.with_rotation(name, |r| r.set_rotation(*degrees)),
            LeafKind::CallFunc(callback) => callback(),
            LeafKind::CallFuncWithOwner(callback) => callback(owner),
        }
    }

    /// A fresh leaf undoing this one, `None` for absolute leaves
    pub(crate) fn reverse(&self) -> Option<Leaf> {
        let reversed = match &self.0 {
            LeafKind::Delay => Leaf::delay(),
            LeafKind::MoveBy { delta, .. } => Leaf::move_by(-*delta),
            LeafKind::RotateBy { angle, .. } => Leaf::rotate_by(-angle),
            LeafKind::ScaleBy { factor, .. } => Leaf::scale_by(1.0 / factor.0, 1.0 / factor.1),
            LeafKind::FadeIn { .. } => Leaf::fade_out(),
            LeafKind::FadeOut { .. } => Leaf::fade_in(),
            LeafKind::TintBy { delta, .. } => Leaf::tint_by(delta.negated()),
            LeafKind::Blink { times } => Leaf::blink(*times),
            LeafKind::JumpBy {
                delta,
                height,
                jumps,
                ..
            } => Leaf::jump_by(-*delta, *height, *jumps),
            LeafKind::BezierBy { curve, .. } => Leaf::bezier_by(curve.reversed()),
            LeafKind::Show => Leaf::hide(),
            LeafKind::Hide => Leaf::show(),
            LeafKind::ToggleVisibility
            | LeafKind::Place(_)
            | LeafKind::Orient(_)
            | LeafKind::CallFunc(_)
            | LeafKind::CallFuncWithOwner(_) => self.clone(),
            LeafKind::MoveTo { .. }
            | LeafKind::RotateTo { .. }
            | LeafKind::ScaleTo { .. }
            | LeafKind::FadeTo { .. }
            | LeafKind::TintTo { .. }
            | LeafKind::JumpTo { .. }
            | LeafKind::BezierTo { .. } => return None,
        };
        Some(reversed)
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
