use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Angle, Pt3D};

/// A straight segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt3D, Pt3D);

impl Line {
    pub fn new(pt1: Pt3D, pt2: Pt3D) -> Line {
        Line(pt1, pt2)
    }

    pub fn length(&self) -> f64 {
        self.0.dist_to(self.1)
    }

    pub fn middle(&self) -> Pt3D {
        self.0.midpoint(self.1)
    }

    /// The heading from the first point to the second in the ground plane.
    pub fn angle(&self) -> Angle {
        (self.1 - self.0).angle_xz()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line({} to {})", self.0, self.1)
    }
}
