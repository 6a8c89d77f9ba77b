use std::fmt;

use serde::{Deserialize, Serialize};

use geom::{Bounds, Pt3D, Ray};
use road_network::SegmentID;

/// A marker point is identified by the segment it belongs to and its position in that
/// approach's list of points. The list only changes when the approach is rebuilt from scratch,
/// so IDs stay valid across ordinary updates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointID {
    pub segment: SegmentID,
    pub idx: usize,
}

impl fmt::Display for PointID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Point {} of {}", self.idx, self.segment)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum PointType {
    /// The outer edge of a run of lanes. `Edge(Left)` sits on the left side of the lane to its
    /// right; `Edge(Right)` sits on the right side of the lane to its left.
    Edge(Side),
    /// Centered in the gap between two adjacent lanes.
    Between,
}

impl PointType {
    pub fn is_edge(self) -> bool {
        matches!(self, PointType::Edge(_))
    }
}

/// A place where markings can start or end.
#[derive(Clone, Debug)]
pub struct MarkerPoint {
    pub id: PointID,
    pub point_type: PointType,
    /// Index of the boundary in the owning approach that produced this point.
    pub(crate) boundary: usize,

    position: Pt3D,
    /// Unit vector pointing into the intersection.
    direction: Pt3D,
    bounds: Bounds,
}

impl MarkerPoint {
    pub(crate) fn new(id: PointID, boundary: usize, point_type: PointType) -> MarkerPoint {
        MarkerPoint {
            id,
            point_type,
            boundary,
            position: Pt3D::ZERO,
            direction: Pt3D::ZERO,
            bounds: Bounds::centered(Pt3D::ZERO, 0.0),
        }
    }

    pub(crate) fn set_geometry(&mut self, position: Pt3D, direction: Pt3D, marker_size: f64) {
        self.position = position;
        self.direction = direction;
        self.bounds = Bounds::centered(position, marker_size);
    }

    pub fn position(&self) -> Pt3D {
        self.position
    }

    pub fn direction(&self) -> Pt3D {
        self.direction
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Returns the distance along the ray to this point's box, if the ray hits it.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        self.bounds.intersect_ray(ray)
    }
}
