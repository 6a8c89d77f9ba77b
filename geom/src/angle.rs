use std::f64;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle in the ground plane, measured counter-clockwise from +X towards +Z. Stores radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn degrees(degs: f64) -> Angle {
        Angle(degs.to_radians())
    }

    /// The angle of a ground-plane vector.
    pub fn from_xz(x: f64, z: f64) -> Angle {
        Angle(z.atan2(x))
    }

    /// [0, 2pi)
    pub fn normalized_radians(self) -> f64 {
        let x = self.0.rem_euclid(2.0 * f64::consts::PI);
        // rem_euclid can round up to exactly 2pi for tiny negative inputs
        if x >= 2.0 * f64::consts::PI {
            0.0
        } else {
            x
        }
    }

    /// [0, 360)
    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }

    /// True if the two angles are within `tolerance_degs` of each other, handling wraparound.
    pub fn approx_eq(self, other: Angle, tolerance_degs: f64) -> bool {
        let diff = (self.normalized_degrees() - other.normalized_degrees()).abs();
        diff.min(360.0 - diff) <= tolerance_degs
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}
