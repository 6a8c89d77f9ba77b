use anyhow::{Context, Result};

use geom::Pt3D;
use road_network::{LaneID, LaneInfo, NetworkSource, NodeID, SegmentID, SegmentInfo};

use crate::lanes::ApproachEnd;
use crate::{DriveLane, LaneBoundary, MarkerPoint, MarkupConfig, PointID};

/// One segment as it meets one node, with the marker points across its end.
#[derive(Clone, Debug)]
pub struct Approach {
    pub node: NodeID,
    pub segment: SegmentID,
    is_start_side: bool,
    is_lane_invert: bool,
    /// Unit vector along the corner line, used to push edge points out from lane centers.
    corner_dir: Pt3D,

    /// Ordered so that boundaries read left to right, looking into the node.
    lanes: Vec<DriveLane>,
    /// One before each lane and one after the last. Empty if there are no drivable lanes.
    boundaries: Vec<LaneBoundary>,
    /// Flattened from the boundaries, in order.
    points: Vec<MarkerPoint>,
}

impl Approach {
    pub fn new(
        node: NodeID,
        segment: SegmentID,
        src: &dyn NetworkSource,
        cfg: &MarkupConfig,
    ) -> Result<Approach> {
        let info = src.segment_info(segment)?;
        let is_start_side = info.start_node == node;
        if !is_start_side && info.end_node != node {
            bail!("{} doesn't touch {}", segment, node);
        }
        let is_lane_invert = is_start_side ^ info.invert;

        let mut drive_lanes: Vec<&LaneInfo> = info.lanes.iter().filter(|l| l.drivable).collect();
        drive_lanes.sort_by(|a, b| a.position.total_cmp(&b.position));
        if !is_lane_invert {
            drive_lanes.reverse();
        }
        let lanes: Vec<DriveLane> = drive_lanes
            .into_iter()
            .map(|l| DriveLane::new(l, is_lane_invert))
            .collect();

        let mut boundaries = Vec::new();
        if !lanes.is_empty() {
            for i in 0..=lanes.len() {
                let left = if i > 0 { lanes.get(i - 1).cloned() } else { None };
                let right = lanes.get(i).cloned();
                boundaries.push(LaneBoundary::new(left, right));
            }
        }

        let mut points = Vec::new();
        for (boundary_idx, boundary) in boundaries.iter().enumerate() {
            for point_type in boundary.point_types() {
                let id = PointID {
                    segment,
                    idx: points.len(),
                };
                points.push(MarkerPoint::new(id, boundary_idx, point_type));
            }
        }

        let mut approach = Approach {
            node,
            segment,
            is_start_side,
            is_lane_invert,
            corner_dir: Pt3D::ZERO,
            lanes,
            boundaries,
            points,
        };
        approach
            .update(src, cfg)
            .with_context(|| format!("Building the approach of {} into {}", segment, node))?;
        Ok(approach)
    }

    /// Recalculates the corner direction and every point's placement, keeping the structure.
    pub fn update(&mut self, src: &dyn NetworkSource, cfg: &MarkupConfig) -> Result<()> {
        let info = src.segment_info(self.segment)?;
        let corner_angle = if self.is_start_side {
            info.corner_angle_start
        } else {
            info.corner_angle_end
        };
        let sign = if self.is_lane_invert { -1.0 } else { 1.0 };
        self.corner_dir = Pt3D::right()
            .turn_degs(f64::from(corner_angle) / 255.0 * 360.0)
            .normalized()
            * sign;

        let end = ApproachEnd {
            is_start_side: self.is_start_side,
            corner_dir: self.corner_dir,
        };
        let mut placements = Vec::with_capacity(self.points.len());
        for pt in &self.points {
            let placement = self.boundaries[pt.boundary]
                .position_and_direction(pt.point_type, end, src)
                .with_context(|| {
                    format!("Placing {} at {} (corner angle {})", pt.id, self.node, corner_angle)
                })?;
            placements.push(placement);
        }
        for (pt, (position, direction)) in self.points.iter_mut().zip(placements) {
            pt.set_geometry(position, direction, cfg.marker_size);
        }
        Ok(())
    }

    /// False if the segment changed in a way that `update` can't absorb: it flipped ends, or its
    /// drivable lanes are different.
    pub fn matches(&self, info: &SegmentInfo) -> bool {
        if (info.start_node == self.node) != self.is_start_side
            || (self.is_start_side ^ info.invert) != self.is_lane_invert
        {
            return false;
        }
        let mut current: Vec<LaneID> = info
            .lanes
            .iter()
            .filter(|l| l.drivable)
            .map(|l| l.id)
            .collect();
        let mut built: Vec<LaneID> = self.lanes.iter().map(|l| l.id).collect();
        current.sort();
        built.sort();
        current == built
    }

    pub fn is_start_side(&self) -> bool {
        self.is_start_side
    }

    pub fn is_lane_invert(&self) -> bool {
        self.is_lane_invert
    }

    pub fn corner_dir(&self) -> Pt3D {
        self.corner_dir
    }

    pub fn lanes(&self) -> &Vec<DriveLane> {
        &self.lanes
    }

    pub fn boundaries(&self) -> &Vec<LaneBoundary> {
        &self.boundaries
    }

    pub fn points(&self) -> &Vec<MarkerPoint> {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, idx: usize) -> Option<&MarkerPoint> {
        self.points.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use road_network::{LaneSpec, LaneType, Network};

    use super::*;
    use crate::{PointType, Side};

    // A one-way road coming from the west into a node at the origin, and another leaving to the
    // east. Both have two lanes centered at -1.5 and 1.5.
    fn through_road() -> (Network, NodeID, SegmentID, SegmentID) {
        let mut net = Network::new();
        let west = net.add_node(Pt3D::ground(-30.0, 0.0), 0.0);
        let center = net.add_node(Pt3D::ground(0.0, 0.0), 10.0);
        let east = net.add_node(Pt3D::ground(30.0, 0.0), 0.0);
        let lanes = vec![LaneSpec::driving(-1.5, 3.0), LaneSpec::driving(1.5, 3.0)];
        let incoming = net.add_segment(west, center, lanes.clone()).unwrap();
        let outgoing = net.add_segment(center, east, lanes).unwrap();
        (net, center, incoming, outgoing)
    }

    fn types(a: &Approach) -> Vec<PointType> {
        a.points().iter().map(|pt| pt.point_type).collect()
    }

    #[test]
    fn two_lane_approach() {
        let (net, center, incoming, _) = through_road();
        let a = Approach::new(center, incoming, &net, &MarkupConfig::default()).unwrap();
        assert!(!a.is_start_side());
        assert!(!a.is_lane_invert());
        assert_eq!(a.boundaries().len(), 3);
        assert_eq!(
            types(&a),
            vec![
                PointType::Edge(Side::Left),
                PointType::Between,
                PointType::Edge(Side::Right)
            ]
        );

        // Points sit at the end of the segment, 10m short of the node
        let positions: Vec<Pt3D> = a.points().iter().map(|pt| pt.position()).collect();
        assert!(positions[0].approx_eq(Pt3D::ground(-10.0, 3.0), 0.02));
        assert!(positions[1].approx_eq(Pt3D::ground(-10.0, 0.0), 1e-9));
        assert!(positions[2].approx_eq(Pt3D::ground(-10.0, -3.0), 0.02));
        for pt in a.points() {
            assert!(pt.direction().approx_eq(Pt3D::ground(1.0, 0.0), 1e-9));
            assert!(pt.bounds().contains(pt.position()));
        }
    }

    #[test]
    fn start_side_points_face_the_node() {
        let (net, center, _, outgoing) = through_road();
        let a = Approach::new(center, outgoing, &net, &MarkupConfig::default()).unwrap();
        assert!(a.is_start_side());
        assert!(a.is_lane_invert());
        assert_eq!(a.point_count(), 3);

        let between = a.point(1).unwrap();
        assert_eq!(between.point_type, PointType::Between);
        assert!(between.position().approx_eq(Pt3D::ground(10.0, 0.0), 1e-9));
        assert!(between.direction().approx_eq(Pt3D::ground(-1.0, 0.0), 1e-9));
        assert!(a.point(0).unwrap().position().approx_eq(Pt3D::ground(10.0, -3.0), 0.02));
        assert!(a.point(2).unwrap().position().approx_eq(Pt3D::ground(10.0, 3.0), 0.02));
        assert!(a.point(3).is_none());
    }

    #[test]
    fn only_drivable_lanes_count() {
        let (mut net, center, incoming, _) = through_road();
        net.mut_segment(incoming).unwrap().lanes.push(LaneSpec {
            lane_type: LaneType::Sidewalk,
            position: 4.5,
            width: 3.0,
        });
        let a = Approach::new(center, incoming, &net, &MarkupConfig::default()).unwrap();
        assert_eq!(a.lanes().len(), 2);
        assert_eq!(a.point_count(), 3);

        net.mut_segment(incoming).unwrap().lanes = vec![LaneSpec {
            lane_type: LaneType::Parking,
            position: 0.0,
            width: 2.0,
        }];
        let a = Approach::new(center, incoming, &net, &MarkupConfig::default()).unwrap();
        assert!(a.boundaries().is_empty());
        assert_eq!(a.point_count(), 0);
    }

    #[test]
    fn skewed_corner_pushes_edges_further() {
        let (mut net, center, incoming, _) = through_road();
        // The corner line is 45 degrees off from perpendicular.
        net.mut_segment(incoming).unwrap().corner_angle_end = Some(223);
        let a = Approach::new(center, incoming, &net, &MarkupConfig::default()).unwrap();
        let corner = a.corner_dir();
        assert!(corner.angle_xz().approx_eq(geom::Angle::degrees(314.8), 0.1));

        // The lane edge is 1.5m from its center, so along a 45 degree corner it's ~2.12m away.
        let edge = a.point(0).unwrap().position();
        let lane_end = Pt3D::ground(-10.0, 1.5);
        assert!((edge.dist_to(lane_end) - 1.5 / 45.2_f64.to_radians().sin()).abs() < 0.05);
    }

    #[test]
    fn update_tracks_geometry() {
        let (mut net, center, incoming, _) = through_road();
        let cfg = MarkupConfig::default();
        let mut a = Approach::new(center, incoming, &net, &cfg).unwrap();

        let seg = net.mut_segment(incoming).unwrap();
        seg.end_pt = Pt3D::ground(-12.0, 0.0);
        a.update(&net, &cfg).unwrap();
        assert!(a.point(1).unwrap().position().approx_eq(Pt3D::ground(-12.0, 0.0), 1e-9));
    }

    #[test]
    fn median_splits_on_both_layouts() {
        let mut net = Network::new();
        let west = net.add_node(Pt3D::ground(-30.0, 0.0), 0.0);
        let center = net.add_node(Pt3D::ground(0.0, 0.0), 10.0);
        // Two lanes with a 3m median between their facing sides
        let lanes = vec![LaneSpec::driving(-3.0, 3.0), LaneSpec::driving(3.0, 3.0)];
        let incoming = net.add_segment(west, center, lanes).unwrap();

        let layout = |net: &Network| -> Vec<(PointType, f64)> {
            let a = Approach::new(center, incoming, net, &MarkupConfig::default()).unwrap();
            assert_eq!(a.boundaries().len(), 3);
            for pt in a.points() {
                assert!((pt.position().x() + 10.0).abs() < 0.05);
                assert!(pt.direction().approx_eq(Pt3D::ground(1.0, 0.0), 1e-9));
            }
            a.points()
                .iter()
                .map(|pt| (pt.point_type, pt.position().z()))
                .collect()
        };
        let check = |actual: Vec<(PointType, f64)>, expected: [(PointType, f64); 4]| {
            assert_eq!(actual.len(), 4);
            for ((actual_type, actual_z), (expected_type, expected_z)) in
                actual.into_iter().zip(expected)
            {
                assert_eq!(actual_type, expected_type);
                assert!((actual_z - expected_z).abs() < 0.02, "{} vs {}", actual_z, expected_z);
            }
        };

        let left = PointType::Edge(Side::Left);
        let right = PointType::Edge(Side::Right);
        check(
            layout(&net),
            [(left, 4.5), (right, 1.5), (left, -1.5), (right, -4.5)],
        );

        net.mut_segment(incoming).unwrap().invert = true;
        let a = Approach::new(center, incoming, &net, &MarkupConfig::default()).unwrap();
        assert!(!a.is_start_side());
        assert!(a.is_lane_invert());
        check(
            layout(&net),
            [(left, -4.5), (right, -1.5), (left, 1.5), (right, 4.5)],
        );
    }

    #[test]
    fn lane_changes_need_a_rebuild() {
        let (mut net, center, incoming, _) = through_road();
        let a = Approach::new(center, incoming, &net, &MarkupConfig::default()).unwrap();
        assert!(a.matches(&net.segment_info(incoming).unwrap()));

        net.mut_segment(incoming).unwrap().lanes.push(LaneSpec {
            lane_type: LaneType::Biking,
            position: 4.0,
            width: 2.0,
        });
        assert!(a.matches(&net.segment_info(incoming).unwrap()));

        net.mut_segment(incoming).unwrap().lanes.push(LaneSpec::driving(5.5, 3.0));
        assert!(!a.matches(&net.segment_info(incoming).unwrap()));
    }

    #[test]
    fn wrong_node() {
        let (net, _, incoming, _) = through_road();
        assert!(Approach::new(NodeID(99), incoming, &net, &MarkupConfig::default()).is_err());
    }
}
