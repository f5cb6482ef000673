//! Small 2D math helpers on top of [`vek`].

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use vek::Vec2;

/// Position with a rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Iso {
    /// Position before being rotated.
    pub pos: Vec2<f64>,
    /// Rotation.
    pub rot: Rotation,
}

impl Iso {
    /// Construct from a position and a rotation.
    pub fn new<P, R>(pos: P, rot: R) -> Self
    where
        P: Into<Vec2<f64>>,
        R: Into<Rotation>,
    {
        let pos = pos.into();
        let rot = rot.into();

        Self { pos, rot }
    }

    /// Construct from a position with a rotation of zero.
    pub fn from_pos<P>(pos: P) -> Self
    where
        P: Into<Vec2<f64>>,
    {
        let pos = pos.into();
        let rot = Rotation::default();

        Self { pos, rot }
    }

    /// Rotate a relative point and add the position.
    pub fn translate(&self, point: Vec2<f64>) -> Vec2<f64> {
        self.pos + self.rot.rotate(point)
    }

    /// Inverse of [`Self::translate`], mapping a world point into the local frame.
    pub fn inverse_translate(&self, point: Vec2<f64>) -> Vec2<f64> {
        (-self.rot).rotate(point - self.pos)
    }
}

impl From<(Vec2<f64>, Rotation)> for Iso {
    fn from((pos, rot): (Vec2<f64>, Rotation)) -> Self {
        Self { pos, rot }
    }
}

/// Rotation split into it's sine and cosine parts.
///
/// This allows something to rotate infinitely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Cosine part of the rotation.
    cos: f64,
    /// Sine part of the rotation.
    sin: f64,
}

impl Rotation {
    /// Create from radians.
    pub fn from_radians(rotation: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();

        Self { sin, cos }
    }

    /// Create from degrees.
    pub fn from_degrees(rotation: f64) -> Self {
        Self::from_radians(rotation.to_radians())
    }

    /// Convert to radians.
    pub fn to_radians(self) -> f64 {
        self.sin.atan2(self.cos)
    }

    /// Convert to degrees.
    pub fn to_degrees(self) -> f64 {
        self.to_radians().to_degrees()
    }

    /// Rotate a point.
    pub fn rotate(&self, point: Vec2<f64>) -> Vec2<f64> {
        Vec2::new(
            point.x * self.cos - point.y * self.sin,
            point.x * self.sin + point.y * self.cos,
        )
    }

    /// Sine.
    pub fn sin(&self) -> f64 {
        self.sin
    }

    /// Cosine.
    pub fn cos(&self) -> f64 {
        self.cos
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self { cos: 1.0, sin: 0.0 }
    }
}

impl From<f64> for Rotation {
    fn from(value: f64) -> Self {
        Self::from_radians(value)
    }
}

impl AddAssign<f64> for Rotation {
    fn add_assign(&mut self, rhs: f64) {
        *self = *self + rhs;
    }
}

impl AddAssign<Self> for Rotation {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Add<f64> for Rotation {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        self + Self::from_radians(rhs)
    }
}

impl Add<Self> for Rotation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            cos: self.cos * rhs.cos - self.sin * rhs.sin,
            sin: self.sin * rhs.cos + self.cos * rhs.sin,
        }
    }
}

impl SubAssign<Self> for Rotation {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl SubAssign<f64> for Rotation {
    fn sub_assign(&mut self, rhs: f64) {
        *self = *self - rhs;
    }
}

impl Sub<Self> for Rotation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + -rhs
    }
}

impl Sub<f64> for Rotation {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        self + -Self::from_radians(rhs)
    }
}

impl Neg for Rotation {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

/// Perpendicular dot product, the 2D analog of the cross product.
pub fn perp_dot(a: Vec2<f64>, b: Vec2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Vector rotated a quarter turn counterclockwise.
pub fn perp(v: Vec2<f64>) -> Vec2<f64> {
    Vec2::new(-v.y, v.x)
}

/// Linear velocity of a point at offset `r` on a body spinning with `angular_velocity`.
pub fn angular_velocity_at(angular_velocity: f64, r: Vec2<f64>) -> Vec2<f64> {
    Vec2::new(-angular_velocity * r.y, angular_velocity * r.x)
}

/// Intersection of the infinite lines through `a1`-`a2` and `b1`-`b2`.
///
/// Returns `None` when the lines are (nearly) parallel.
pub fn line_intersection(
    a1: Vec2<f64>,
    a2: Vec2<f64>,
    b1: Vec2<f64>,
    b2: Vec2<f64>,
) -> Option<Vec2<f64>> {
    let r = a2 - a1;
    let s = b2 - b1;

    let denominator = perp_dot(r, s);
    if denominator.abs() <= f64::EPSILON {
        return None;
    }

    let t = perp_dot(b1 - a1, s) / denominator;

    Some(a1 + r * t)
}

/// Project a point onto the infinite line through `start` and `end`.
pub fn nearest_point_on_line(start: Vec2<f64>, end: Vec2<f64>, point: Vec2<f64>) -> Vec2<f64> {
    let edge = end - start;

    let length_squared = edge.magnitude_squared();
    if length_squared <= f64::EPSILON {
        return start;
    }

    start + edge * ((point - start).dot(edge) / length_squared)
}
