//! Geometry and color value types mutated by actions
//!
//! Plain `Copy` values: actions capture them at start and interpolate
//! between them on every update.

use std::ops::{Add, Mul, Neg, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Points
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point (also used as a displacement)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector from the origin
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Distance between two points
    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    /// Heading of the vector in degrees, counter-clockwise from +x
    pub fn heading(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Signed turn in degrees from the direction of segment `a` to that of
/// segment `b`, normalized into (-180, 180]
pub fn turn_angle(a: (Point, Point), b: (Point, Point)) -> f32 {
    let from = (a.1 - a.0).heading();
    let to = (b.1 - b.0).heading();
    normalize_delta(to - from)
}

/// Normalize an angle delta in degrees into (-180, 180]
pub fn normalize_delta(degrees: f32) -> f32 {
    let mut delta = degrees % 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    }
    if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color, channels nominally in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Per-channel sum, used by relative tints
    pub fn offset(self, delta: Color, t: f32) -> Color {
        Color::rgba(
            self.r + delta.r * t,
            self.g + delta.g * t,
            self.b + delta.b * t,
            self.a + delta.a * t,
        )
    }

    /// Per-channel linear interpolation towards `other`
    pub fn lerp(self, other: Color, t: f32) -> Color {
        self.offset(other.difference(self), t)
    }

    /// Channel-wise `self - other`
    pub fn difference(self, other: Color) -> Color {
        Color::rgba(
            self.r - other.r,
            self.g - other.g,
            self.b - other.b,
            self.a - other.a,
        )
    }

    /// Every channel negated
    pub fn negated(self) -> Color {
        Color::rgba(-self.r, -self.g, -self.b, -self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Paths
// ─────────────────────────────────────────────────────────────────────────────

/// How the points of a [`Path`] are interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathKind {
    /// Points are absolute positions; the owner is placed on the first one
    #[default]
    Absolute,
    /// Points are offsets: the walk starts wherever the owner is, which
    /// stands in for the first point
    Relative,
}

/// An open polyline followed by path actions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    points: Vec<Point>,
    kind: PathKind,
}

impl Path {
    /// Path through absolute positions
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
            kind: PathKind::Absolute,
        }
    }

    /// Path whose shape is replayed from the owner's starting position
    pub fn relative(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
            kind: PathKind::Relative,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Builder: append a point
    pub fn with_point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    /// Sum of all segment lengths
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a + b, Point::new(5.0, 8.0));
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_eq!(-a, Point::new(-1.0, -2.0));
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.lerp(b, 0.5), Point::new(2.5, 4.0));
    }

    #[test]
    fn test_normalize_delta_range() {
        assert_eq!(normalize_delta(190.0), -170.0);
        assert_eq!(normalize_delta(-190.0), 170.0);
        assert_eq!(normalize_delta(180.0), 180.0);
        assert_eq!(normalize_delta(-180.0), 180.0);
        assert_eq!(normalize_delta(720.0 + 45.0), 45.0);
    }

    #[test]
    fn test_turn_angle() {
        let right = (Point::ZERO, Point::new(1.0, 0.0));
        let up = (Point::new(1.0, 0.0), Point::new(1.0, 1.0));
        assert!((turn_angle(right, up) - 90.0).abs() < 1e-4);
        assert!((turn_angle(up, right) + 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_lerp_and_offset() {
        let from = Color::rgba(0.0, 0.5, 1.0, 1.0);
        let to = Color::rgba(1.0, 0.5, 0.0, 0.0);
        assert_eq!(from.lerp(to, 0.5), Color::rgba(0.5, 0.5, 0.5, 0.5));
        assert_eq!(
            from.offset(Color::rgba(0.25, 0.25, -0.25, -0.5), 1.0),
            Color::rgba(0.25, 0.75, 0.75, 0.5)
        );
    }

    #[test]
    fn test_path_length() {
        let path = Path::new([Point::ZERO, Point::new(3.0, 4.0), Point::new(3.0, 10.0)]);
        assert_eq!(path.length(), 11.0);
        assert_eq!(path.kind(), PathKind::Absolute);
    }
}
