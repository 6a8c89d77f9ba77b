//! Geometry used to place lane markings at intersections. World space is in meters, with `y`
//! pointing up; most calculations happen in the ground (XZ) plane.

mod angle;
mod bezier;
mod bounds;
mod line;
mod pt;

pub use crate::angle::Angle;
pub use crate::bezier::Bezier3;
pub use crate::bounds::{Bounds, Ray};
pub use crate::line::Line;
pub use crate::pt::Pt3D;

/// Used to compare floating point positions and lengths.
pub const EPSILON_DIST: f64 = 1e-6;
