use std::fmt;

use serde::{Deserialize, Serialize};

use geom::Pt3D;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeID(pub usize);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Node #{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentID(pub usize);

impl fmt::Display for SegmentID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Segment #{}", self.0)
    }
}

/// A lane is identified by its parent segment and its index in that segment's lane list.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneID {
    pub segment: SegmentID,
    pub offset: usize,
}

impl fmt::Display for LaneID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Lane #{}/{}", self.segment.0, self.offset)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum LaneType {
    Driving,
    Bus,
    Biking,
    Parking,
    Sidewalk,
}

impl LaneType {
    /// Only lanes that cars travel on get markings.
    pub fn is_drivable(self) -> bool {
        matches!(self, LaneType::Driving | LaneType::Bus)
    }
}

/// An intersection. Segments stop `radius` meters short of its center.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeID,
    pub pt: Pt3D,
    #[serde(default)]
    pub radius: f64,
}

/// How one lane sits across its segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneSpec {
    pub lane_type: LaneType,
    /// Lateral offset of the lane's center from the segment's center line. Positive values are
    /// to the left when looking from the start of the segment to its end.
    pub position: f64,
    pub width: f64,
}

impl LaneSpec {
    pub fn driving(position: f64, width: f64) -> LaneSpec {
        LaneSpec {
            lane_type: LaneType::Driving,
            position,
            width,
        }
    }
}

/// A straight road between two nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentID,
    pub start_node: NodeID,
    pub end_node: NodeID,
    /// Where the segment's geometry begins and ends, at the edge of each node.
    pub start_pt: Pt3D,
    pub end_pt: Pt3D,
    #[serde(default)]
    pub invert: bool,
    pub lanes: Vec<LaneSpec>,
    /// The direction of the corner line at each end, on a 0-255 scale covering a full turn.
    /// When absent, it's derived from the segment's geometry.
    #[serde(default)]
    pub corner_angle_start: Option<u8>,
    #[serde(default)]
    pub corner_angle_end: Option<u8>,
}

impl Segment {
    /// Unit direction from start to end, in the ground plane.
    pub fn direction(&self) -> Pt3D {
        (self.end_pt - self.start_pt).normalized_xz().0
    }

    /// Unit vector pointing towards increasing lane positions.
    pub fn lateral(&self) -> Pt3D {
        let dir = self.direction();
        Pt3D::ground(-dir.z(), dir.x())
    }

    /// The corner line runs across the segment towards decreasing lane positions, the same way
    /// at both ends.
    pub fn default_corner_angle(&self) -> u8 {
        let degs = (-self.lateral()).angle_xz().normalized_degrees();
        (degs / 360.0 * 255.0).round().clamp(0.0, 255.0) as u8
    }
}

/// What `NetworkSource` reports about one segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub id: SegmentID,
    pub start_node: NodeID,
    pub end_node: NodeID,
    pub invert: bool,
    pub corner_angle_start: u8,
    pub corner_angle_end: u8,
    pub lanes: Vec<LaneInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneInfo {
    pub id: LaneID,
    pub drivable: bool,
    pub position: f64,
    pub width: f64,
}
