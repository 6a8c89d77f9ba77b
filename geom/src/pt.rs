use std::fmt;
use std::ops;

use serde::{Deserialize, Serialize};

use crate::{Angle, EPSILON_DIST};

/// A position in world-space, in meters. The same type doubles as a direction or offset
/// vector; callers decide which one they mean.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt3D {
    x: f64,
    y: f64,
    z: f64,
}

impl Pt3D {
    pub const ZERO: Pt3D = Pt3D::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Pt3D {
        Pt3D { x, y, z }
    }

    /// A point on the ground plane.
    pub const fn ground(x: f64, z: f64) -> Pt3D {
        Pt3D { x, y: 0.0, z }
    }

    /// The unit vector along +X. Corner directions are expressed as a turn from this.
    pub const fn right() -> Pt3D {
        Pt3D::new(1.0, 0.0, 0.0)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn dot(self, other: Pt3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dist_to(self, other: Pt3D) -> f64 {
        (other - self).length()
    }

    /// Scales to unit length. The zero vector stays zero.
    pub fn normalized(self) -> Pt3D {
        let len = self.length();
        if len <= EPSILON_DIST {
            return Pt3D::ZERO;
        }
        self / len
    }

    /// Like `normalized`, but only looks at the ground plane. Also returns the original
    /// ground-plane length.
    pub fn normalized_xz(self) -> (Pt3D, f64) {
        let len = (self.x * self.x + self.z * self.z).sqrt();
        if len <= EPSILON_DIST {
            return (Pt3D::ZERO, len);
        }
        (Pt3D::new(self.x / len, 0.0, self.z / len), len)
    }

    pub fn lerp(self, other: Pt3D, pct: f64) -> Pt3D {
        self + (other - self) * pct
    }

    pub fn midpoint(self, other: Pt3D) -> Pt3D {
        (self + other) / 2.0
    }

    /// The unsigned angle between two vectors in degrees, in [0, 180]. Zero vectors produce 0.
    pub fn angle_degs_to(self, other: Pt3D) -> f64 {
        let denom = self.length() * other.length();
        if denom <= EPSILON_DIST * EPSILON_DIST {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// The direction of this vector in the ground plane.
    pub fn angle_xz(self) -> Angle {
        Angle::from_xz(self.x, self.z)
    }

    /// Rotates counter-clockwise around the vertical axis. Height is preserved.
    pub fn turn_degs(self, degrees: f64) -> Pt3D {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Pt3D::new(
            self.x * cos - self.z * sin,
            self.y,
            self.x * sin + self.z * cos,
        )
    }

    pub fn approx_eq(self, other: Pt3D, threshold: f64) -> bool {
        self.dist_to(other) <= threshold
    }
}

impl fmt::Display for Pt3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt3D({0}, {1}, {2})", self.x, self.y, self.z)
    }
}

impl ops::Add for Pt3D {
    type Output = Pt3D;

    fn add(self, other: Pt3D) -> Pt3D {
        Pt3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl ops::Sub for Pt3D {
    type Output = Pt3D;

    fn sub(self, other: Pt3D) -> Pt3D {
        Pt3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl ops::Neg for Pt3D {
    type Output = Pt3D;

    fn neg(self) -> Pt3D {
        Pt3D::new(-self.x, -self.y, -self.z)
    }
}

impl ops::Mul<f64> for Pt3D {
    type Output = Pt3D;

    fn mul(self, scalar: f64) -> Pt3D {
        Pt3D::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl ops::Div<f64> for Pt3D {
    type Output = Pt3D;

    fn div(self, scalar: f64) -> Pt3D {
        if scalar == 0.0 {
            panic!("Can't divide {} by 0", self);
        }
        Pt3D::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turning() {
        let up = Pt3D::right().turn_degs(90.0);
        assert!(up.approx_eq(Pt3D::ground(0.0, 1.0), 1e-9));
        let back = Pt3D::right().turn_degs(180.0);
        assert!(back.approx_eq(Pt3D::ground(-1.0, 0.0), 1e-9));
        assert!((Pt3D::ground(0.0, -2.0).angle_xz().normalized_degrees() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn angles_between_vectors() {
        let a = Pt3D::ground(1.0, 0.0);
        assert!((a.angle_degs_to(Pt3D::ground(0.0, 3.0)) - 90.0).abs() < 1e-9);
        assert!((a.angle_degs_to(Pt3D::ground(-2.0, 0.0)) - 180.0).abs() < 1e-9);
        assert_eq!(a.angle_degs_to(Pt3D::ZERO), 0.0);
    }

    #[test]
    fn normalizing() {
        let v = Pt3D::new(3.0, 12.0, 4.0);
        assert!((v.normalized().length() - 1.0).abs() < 1e-12);
        let (dir, len) = v.normalized_xz();
        assert!((len - 5.0).abs() < 1e-12);
        assert!(dir.approx_eq(Pt3D::ground(0.6, 0.8), 1e-12));
        assert_eq!(Pt3D::ZERO.normalized(), Pt3D::ZERO);
    }
}
