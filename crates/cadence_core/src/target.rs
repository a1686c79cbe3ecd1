//! Owner capability contracts
//!
//! An action mutates an *owner*: some object supplied by the application.
//! Instead of assuming a concrete node type, every property family is a
//! small trait, and an owner opts into the families it supports through
//! [`ActionTarget`]. An action asks only for the capability it needs, and a
//! missing capability surfaces as [`CadenceError::MissingCapability`] the
//! first time the action touches the owner.
//!
//! Owners are shared through [`TargetRef`], which compares by identity so
//! the action manager can key registrations on it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{CadenceError, Result};
use crate::geometry::{Color, Point};

/// Property family an action may require from its owner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Position,
    Rotation,
    Scale,
    Opacity,
    Tint,
    Visibility,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Position => "position",
            Capability::Rotation => "rotation",
            Capability::Scale => "scale",
            Capability::Opacity => "opacity",
            Capability::Tint => "tint",
            Capability::Visibility => "visibility",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capability traits
// ─────────────────────────────────────────────────────────────────────────────

pub trait Positionable {
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
}

/// Rotation in degrees
pub trait Rotatable {
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, degrees: f32);
}

pub trait Scalable {
    fn scale_x(&self) -> f32;
    fn scale_y(&self) -> f32;
    fn set_scale_x(&mut self, scale: f32);
    fn set_scale_y(&mut self, scale: f32);
}

/// Opacity in 0.0..=1.0
pub trait OpacityBearing {
    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);
}

pub trait Tintable {
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
}

pub trait VisibilityToggleable {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
}

/// An object actions can run on
///
/// Implement the `as_*` accessor for every family the type supports; the
/// defaults report the capability as absent.
///
/// ```
/// use cadence_core::{ActionTarget, Point, Positionable};
///
/// #[derive(Default)]
/// struct Marker {
///     position: Point,
/// }
///
/// impl Positionable for Marker {
///     fn position(&self) -> Point {
///         self.position
///     }
///
///     fn set_position(&mut self, position: Point) {
///         self.position = position;
///     }
/// }
///
/// impl ActionTarget for Marker {
///     fn as_positionable(&mut self) -> Option<&mut dyn Positionable> {
///         Some(self)
///     }
/// }
/// ```
pub trait ActionTarget {
    fn as_positionable(&mut self) -> Option<&mut dyn Positionable> {
        None
    }

    fn as_rotatable(&mut self) -> Option<&mut dyn Rotatable> {
        None
    }

    fn as_scalable(&mut self) -> Option<&mut dyn Scalable> {
        None
    }

    fn as_opacity_bearing(&mut self) -> Option<&mut dyn OpacityBearing> {
        None
    }

    fn as_tintable(&mut self) -> Option<&mut dyn Tintable> {
        None
    }

    fn as_visibility_toggleable(&mut self) -> Option<&mut dyn VisibilityToggleable> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared owner handle
// ─────────────────────────────────────────────────────────────────────────────

/// Shared handle to an action owner, compared by identity
#[derive(Clone)]
pub struct TargetRef(Rc<RefCell<dyn ActionTarget>>);

/// Generates a scoped accessor for one capability family.
macro_rules! capability_accessor {
    ($(#[$meta:meta])* $name:ident, $accessor:ident, $cap_trait:ident, $capability:expr) => {
        $(#[$meta])*
        pub fn $name<R>(
            &self,
            action: &'static str,
            f: impl FnOnce(&mut dyn $cap_trait) -> R,
        ) -> Result<R> {
            let mut owner = self
                .0
                .try_borrow_mut()
                .map_err(|_| CadenceError::TargetBusy { action })?;
            let capability = owner
                .$accessor()
                .ok_or(CadenceError::MissingCapability {
                    action,
                    capability: $capability,
                })?;
            Ok(f(capability))
        }
    };
}

impl TargetRef {
    /// Wrap a shared owner
    pub fn new<T: ActionTarget + 'static>(owner: Rc<RefCell<T>>) -> Self {
        Self(owner)
    }

    /// Address of the owner, stable while any handle is alive
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Whether both handles point at the same owner
    pub fn same(&self, other: &TargetRef) -> bool {
        self.id() == other.id()
    }

    capability_accessor!(
        /// Run `f` against the owner's position capability
        with_position, as_positionable, Positionable, Capability::Position
    );
    capability_accessor!(
        /// Run `f` against the owner's rotation capability
        with_rotation, as_rotatable, Rotatable, Capability::Rotation
    );
    capability_accessor!(
        /// Run `f` against the owner's scale capability
        with_scale, as_scalable, Scalable, Capability::Scale
    );
    capability_accessor!(
        /// Run `f` against the owner's opacity capability
        with_opacity, as_opacity_bearing, OpacityBearing, Capability::Opacity
    );
    capability_accessor!(
        /// Run `f` against the owner's color capability
        with_tint, as_tintable, Tintable, Capability::Tint
    );
    capability_accessor!(
        /// Run `f` against the owner's visibility capability
        with_visibility, as_visibility_toggleable, VisibilityToggleable, Capability::Visibility
    );
}

impl<T: ActionTarget + 'static> From<Rc<RefCell<T>>> for TargetRef {
    fn from(owner: Rc<RefCell<T>>) -> Self {
        Self::new(owner)
    }
}

impl PartialEq for TargetRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for TargetRef {}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TargetRef")
            .field(&format_args!("{:#x}", self.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Dot {
        position: Point,
    }

    impl Positionable for Dot {
        fn position(&self) -> Point {
            self.position
        }

        fn set_position(&mut self, position: Point) {
            self.position = position;
        }
    }

    impl ActionTarget for Dot {
        fn as_positionable(&mut self) -> Option<&mut dyn Positionable> {
            Some(self)
        }
    }

    #[test]
    fn test_capability_access() {
        let dot = Rc::new(RefCell::new(Dot::default()));
        let target = TargetRef::from(dot.clone());

        target
            .with_position("test", |p| p.set_position(Point::new(3.0, 4.0)))
            .unwrap();
        assert_eq!(dot.borrow().position, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_missing_capability_fails_on_access() {
        let target = TargetRef::from(Rc::new(RefCell::new(Dot::default())));

        let err = target.with_rotation("RotateBy", |r| r.rotation()).unwrap_err();
        assert_eq!(
            err,
            CadenceError::MissingCapability {
                action: "RotateBy",
                capability: Capability::Rotation,
            }
        );
        assert_eq!(err.to_string(), "RotateBy needs a rotation owner");
    }

    #[test]
    fn test_busy_owner_is_reported() {
        let dot = Rc::new(RefCell::new(Dot::default()));
        let target = TargetRef::from(dot.clone());

        let _guard = dot.borrow_mut();
        assert_eq!(
            target.with_position("MoveBy", |p| p.position()),
            Err(CadenceError::TargetBusy { action: "MoveBy" })
        );
    }

    #[test]
    fn test_identity() {
        let dot = Rc::new(RefCell::new(Dot::default()));
        let a = TargetRef::from(dot.clone());
        let b = TargetRef::from(dot);
        let c = TargetRef::from(Rc::new(RefCell::new(Dot::default())));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
