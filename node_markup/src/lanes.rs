use anyhow::Result;

use geom::Pt3D;
use road_network::{LaneID, LaneInfo, NetworkSource};

use crate::{PointType, Side};

/// A lane that gets markings, as seen from one end of its segment.
#[derive(Clone, Debug, PartialEq)]
pub struct DriveLane {
    pub id: LaneID,
    /// Lateral offset of the lane's center.
    pub position: f64,
    pub half_width: f64,
    /// Copied from the owning approach; flips which side is which.
    invert: bool,
}

impl DriveLane {
    pub fn new(info: &LaneInfo, invert: bool) -> DriveLane {
        DriveLane {
            id: info.id,
            position: info.position,
            half_width: info.width / 2.0,
            invert,
        }
    }

    pub fn left_side_pos(&self) -> f64 {
        if self.invert {
            self.position - self.half_width
        } else {
            self.position + self.half_width
        }
    }

    pub fn right_side_pos(&self) -> f64 {
        if self.invert {
            self.position + self.half_width
        } else {
            self.position - self.half_width
        }
    }
}

/// How an approach meets its node, needed to place points.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ApproachEnd {
    pub is_start_side: bool,
    pub corner_dir: Pt3D,
}

impl ApproachEnd {
    /// Where along the lanes to sample.
    fn t(self) -> f64 {
        if self.is_start_side {
            0.0
        } else {
            1.0
        }
    }
}

/// The space between two adjacent lanes, or between the outermost lane and the side of the
/// road. At least one side is always present.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneBoundary {
    pub left: Option<DriveLane>,
    pub right: Option<DriveLane>,
}

impl LaneBoundary {
    pub fn new(left: Option<DriveLane>, right: Option<DriveLane>) -> LaneBoundary {
        debug_assert!(left.is_some() || right.is_some());
        LaneBoundary { left, right }
    }

    pub fn is_left_edge(&self) -> bool {
        self.left.is_none()
    }

    pub fn is_right_edge(&self) -> bool {
        self.right.is_none()
    }

    pub fn is_edge(&self) -> bool {
        self.is_left_edge() ^ self.is_right_edge()
    }

    /// Distance between the two lane centers. 0 at an edge.
    pub fn center_delta(&self) -> f64 {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => (right.position - left.position).abs(),
            _ => 0.0,
        }
    }

    /// Width of the gap between the facing sides of the two lanes. 0 at an edge.
    pub fn side_delta(&self) -> f64 {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => (right.left_side_pos() - left.right_side_pos()).abs(),
            _ => 0.0,
        }
    }

    /// A wide median gets a marking on each side instead of one down the middle. Note the gap
    /// is compared against the average of the half-widths, not their sum.
    pub fn needs_split(&self) -> bool {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => {
                self.side_delta() >= (right.half_width + left.half_width) / 2.0
            }
            _ => false,
        }
    }

    /// The points this boundary produces, in order.
    pub fn point_types(&self) -> Vec<PointType> {
        if self.is_edge() {
            if self.is_right_edge() {
                vec![PointType::Edge(Side::Right)]
            } else {
                vec![PointType::Edge(Side::Left)]
            }
        } else if self.needs_split() {
            vec![PointType::Edge(Side::Right), PointType::Edge(Side::Left)]
        } else if self.left.is_some() {
            vec![PointType::Between]
        } else {
            Vec::new()
        }
    }

    /// Where a point of the given type sits, and the direction into the intersection.
    pub(crate) fn position_and_direction(
        &self,
        point_type: PointType,
        end: ApproachEnd,
        src: &dyn NetworkSource,
    ) -> Result<(Pt3D, Pt3D)> {
        match point_type {
            PointType::Between => self.middle_position(end, src),
            PointType::Edge(side) => self.edge_position(side, end, src),
        }
    }

    fn middle_position(&self, end: ApproachEnd, src: &dyn NetworkSource) -> Result<(Pt3D, Pt3D)> {
        let (left, right) = match (&self.left, &self.right) {
            (Some(left), Some(right)) => (left, right),
            _ => return Err(internal_error("a middle point needs lanes on both sides")),
        };
        let (right_pos, right_dir) = src.lane_position_and_direction(right.id, end.t())?;
        let (left_pos, left_dir) = src.lane_position_and_direction(left.id, end.t())?;

        let center_delta = self.center_delta();
        let part = if center_delta > geom::EPSILON_DIST {
            (right.half_width + self.side_delta() / 2.0) / center_delta
        } else {
            0.5
        };
        let position = right_pos.lerp(left_pos, part);
        let divisor = if end.is_start_side { -2.0 } else { 2.0 };
        let direction = ((right_dir + left_dir) / divisor).normalized();
        Ok((position, direction))
    }

    fn edge_position(
        &self,
        side: Side,
        end: ApproachEnd,
        src: &dyn NetworkSource,
    ) -> Result<(Pt3D, Pt3D)> {
        let (lane, shift) = match (side, &self.left, &self.right) {
            (Side::Left, _, Some(right)) => (right, -right.half_width),
            (Side::Right, Some(left), _) => (left, left.half_width),
            _ => {
                return Err(internal_error(&format!(
                    "a {:?} edge point is missing its lane",
                    side
                )))
            }
        };
        let (position, direction) = src.lane_position_and_direction(lane.id, end.t())?;
        let direction = if end.is_start_side {
            -direction
        } else {
            direction
        };

        // On a skewed corner, the lane's half-width measured along the corner line is longer.
        let mut angle = direction.angle_degs_to(end.corner_dir);
        if angle > 90.0 {
            angle = 180.0 - angle;
        }
        let sin = angle.to_radians().sin();
        if sin < 1e-3 {
            bail!(
                "The corner of {} runs parallel to the lane (angle {} degrees)",
                lane.id,
                angle
            );
        }

        Ok((
            position + end.corner_dir * (shift / sin),
            direction.normalized(),
        ))
    }
}

/// Only reachable if boundaries produce point types they can't place.
pub(crate) fn internal_error(msg: &str) -> anyhow::Error {
    debug_assert!(false, "{}", msg);
    anyhow!("internal error: {}", msg)
}
