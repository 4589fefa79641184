//! Positions and planar geometry.
//!
//! The simulation is 3D but every distance and angle the decision core
//! reasons about is measured on the ground plane (X/Y). Z is terrain height
//! and is only carried along so that issued orders land on the navmesh.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west coordinate.
    pub x: f32,
    /// North-south coordinate.
    pub y: f32,
    /// Terrain height.
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a ground-plane vector (Z = 0).
    pub const fn flat(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar length of this vector.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Planar distance to `other`.
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Squared planar distance to `other`.
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Return the point `distance` units from `self` along the ray towards
    /// `to`. Height is interpolated along the same ray.
    ///
    /// If `to` coincides with `self` there is no direction to extend along,
    /// so `self` is returned unchanged.
    pub fn extend(self, to: Self, distance: f32) -> Self {
        let delta = to - self;
        let len = delta.length();
        if len <= f32::EPSILON {
            return self;
        }
        self + delta * (distance / len)
    }

    /// Polar angle of this vector on the ground plane, in degrees `[0, 360)`.
    pub fn polar(self) -> f32 {
        let deg = self.y.atan2(self.x).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// Unsigned planar angle between two direction vectors, in degrees
    /// `[0, 180]`.
    pub fn angle_between(self, other: Self) -> f32 {
        let mut theta = self.polar() - other.polar();
        if theta < 0.0 {
            theta += 360.0;
        }
        if theta > 180.0 {
            theta = 360.0 - theta;
        }
        theta
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Total planar length of a polyline.
pub fn path_length(path: &[Vec3]) -> f32 {
    path.windows(2)
        .map(|pair| match pair {
            [a, b] => a.distance(*b),
            _ => 0.0,
        })
        .sum()
}
