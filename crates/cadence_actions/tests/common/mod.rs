//! Shared test owner

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cadence_actions::Action;
use cadence_core::{
    ActionTarget, Color, OpacityBearing, Point, Positionable, Rotatable, Scalable, TargetRef,
    Tintable, VisibilityToggleable,
};

/// An owner exposing every capability and remembering every position it had
pub struct Sprite {
    pub position: Point,
    pub rotation: f32,
    pub scale: (f32, f32),
    pub opacity: f32,
    pub color: Color,
    pub visible: bool,
    pub positions: Vec<Point>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            rotation: 0.0,
            scale: (1.0, 1.0),
            opacity: 1.0,
            color: Color::WHITE,
            visible: true,
            positions: Vec::new(),
        }
    }
}

impl Positionable for Sprite {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
        self.positions.push(position);
    }
}

impl Rotatable for Sprite {
    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }
}

impl Scalable for Sprite {
    fn scale_x(&self) -> f32 {
        self.scale.0
    }

    fn scale_y(&self) -> f32 {
        self.scale.1
    }

    fn set_scale_x(&mut self, scale: f32) {
        self.scale.0 = scale;
    }

    fn set_scale_y(&mut self, scale: f32) {
        self.scale.1 = scale;
    }
}

impl OpacityBearing for Sprite {
    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}

impl Tintable for Sprite {
    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl VisibilityToggleable for Sprite {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl ActionTarget for Sprite {
    fn as_positionable(&mut self) -> Option<&mut dyn Positionable> {
        Some(self)
    }

    fn as_rotatable(&mut self) -> Option<&mut dyn Rotatable> {
        Some(self)
    }

    fn as_scalable(&mut self) -> Option<&mut dyn Scalable> {
        Some(self)
    }

    fn as_opacity_bearing(&mut self) -> Option<&mut dyn OpacityBearing> {
        Some(self)
    }

    fn as_tintable(&mut self) -> Option<&mut dyn Tintable> {
        Some(self)
    }

    fn as_visibility_toggleable(&mut self) -> Option<&mut dyn VisibilityToggleable> {
        Some(self)
    }
}

/// An owner that only has a position
#[derive(Default)]
pub struct Marker {
    pub position: Point,
}

impl Positionable for Marker {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

impl ActionTarget for Marker {
    fn as_positionable(&mut self) -> Option<&mut dyn Positionable> {
        Some(self)
    }
}

pub fn sprite() -> (Rc<RefCell<Sprite>>, TargetRef) {
    let sprite = Rc::new(RefCell::new(Sprite::default()));
    let target = TargetRef::from(sprite.clone());
    (sprite, target)
}

pub fn marker() -> (Rc<RefCell<Marker>>, TargetRef) {
    let marker = Rc::new(RefCell::new(Marker::default()));
    let target = TargetRef::from(marker.clone());
    (marker, target)
}

/// A call action and the number of times it ran
pub fn counter() -> (Rc<Cell<u32>>, Action) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    let action = Action::call(move || {
        inner.set(inner.get() + 1);
        Ok(())
    });
    (count, action)
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

pub fn approx_point(a: Point, b: Point) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}

/// Route logs to the test output; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
