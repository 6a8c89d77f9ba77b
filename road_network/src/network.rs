use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use abstutil::{deserialize_btreemap, serialize_btreemap};
use geom::Pt3D;

use crate::{
    LaneID, LaneInfo, LaneSpec, NetworkSource, Node, NodeID, Segment, SegmentID, SegmentInfo,
};

/// An in-memory network snapshot with straight segments.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Network {
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    nodes: BTreeMap<NodeID, Node>,
    #[serde(
        serialize_with = "serialize_btreemap",
        deserialize_with = "deserialize_btreemap"
    )]
    segments: BTreeMap<SegmentID, Segment>,
}

impl Network {
    pub fn new() -> Network {
        Network::default()
    }

    pub fn load(path: &str) -> Result<Network> {
        let network: Network = abstutil::read_json(path)?;
        network.validate()?;
        info!(
            "Loaded {} with {} nodes and {} segments",
            path,
            network.nodes.len(),
            network.segments.len()
        );
        Ok(network)
    }

    /// Checks that every segment refers to existing nodes and has sane lanes.
    pub fn validate(&self) -> Result<()> {
        for (id, node) in &self.nodes {
            if *id != node.id {
                bail!("{} is stored under {}", node.id, id);
            }
        }
        for (id, seg) in &self.segments {
            if *id != seg.id {
                bail!("{} is stored under {}", seg.id, id);
            }
            for n in [seg.start_node, seg.end_node] {
                if !self.nodes.contains_key(&n) {
                    bail!("{} refers to missing {}", seg.id, n);
                }
            }
            if seg.start_pt.dist_to(seg.end_pt) <= geom::EPSILON_DIST {
                bail!("{} has no length", seg.id);
            }
            for (idx, lane) in seg.lanes.iter().enumerate() {
                if !(lane.width > 0.0) {
                    bail!("Lane {} of {} has width {}", idx, seg.id, lane.width);
                }
            }
        }
        Ok(())
    }

    pub fn add_node(&mut self, pt: Pt3D, radius: f64) -> NodeID {
        let id = NodeID(self.nodes.keys().next_back().map(|n| n.0 + 1).unwrap_or(0));
        self.nodes.insert(id, Node { id, pt, radius });
        id
    }

    /// Connects two nodes with a straight segment. The geometry is pulled back from each node
    /// center by that node's radius.
    pub fn add_segment(
        &mut self,
        start_node: NodeID,
        end_node: NodeID,
        lanes: Vec<LaneSpec>,
    ) -> Result<SegmentID> {
        let from = self.get_node(start_node)?;
        let to = self.get_node(end_node)?;
        let (dir, len) = (to.pt - from.pt).normalized_xz();
        if len <= from.radius + to.radius {
            bail!(
                "{} and {} are too close together to connect",
                start_node,
                end_node
            );
        }

        let id = SegmentID(
            self.segments
                .keys()
                .next_back()
                .map(|s| s.0 + 1)
                .unwrap_or(0),
        );
        let segment = Segment {
            id,
            start_node,
            end_node,
            start_pt: from.pt + dir * from.radius,
            end_pt: to.pt - dir * to.radius,
            invert: false,
            lanes,
            corner_angle_start: None,
            corner_angle_end: None,
        };
        self.segments.insert(id, segment);
        Ok(id)
    }

    pub fn remove_segment(&mut self, id: SegmentID) -> Option<Segment> {
        self.segments.remove(&id)
    }

    pub fn get_node(&self, id: NodeID) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| anyhow!("Unknown {}", id))
    }

    pub fn get_segment(&self, id: SegmentID) -> Result<&Segment> {
        self.segments
            .get(&id)
            .ok_or_else(|| anyhow!("Unknown {}", id))
    }

    pub fn mut_segment(&mut self, id: SegmentID) -> Result<&mut Segment> {
        self.segments
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Unknown {}", id))
    }

    pub fn all_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }
}

impl NetworkSource for Network {
    fn node_segments(&self, node: NodeID) -> Result<Vec<SegmentID>> {
        self.get_node(node)?;
        Ok(self
            .segments
            .values()
            .filter(|s| s.start_node == node || s.end_node == node)
            .map(|s| s.id)
            .collect())
    }

    fn segment_info(&self, id: SegmentID) -> Result<SegmentInfo> {
        let seg = self.get_segment(id)?;
        let default_angle = seg.default_corner_angle();
        Ok(SegmentInfo {
            id,
            start_node: seg.start_node,
            end_node: seg.end_node,
            invert: seg.invert,
            corner_angle_start: seg.corner_angle_start.unwrap_or(default_angle),
            corner_angle_end: seg.corner_angle_end.unwrap_or(default_angle),
            lanes: seg
                .lanes
                .iter()
                .enumerate()
                .map(|(offset, spec)| LaneInfo {
                    id: LaneID { segment: id, offset },
                    drivable: spec.lane_type.is_drivable(),
                    position: spec.position,
                    width: spec.width,
                })
                .collect(),
        })
    }

    fn lane_position_and_direction(&self, lane: LaneID, t: f64) -> Result<(Pt3D, Pt3D)> {
        if !(0.0..=1.0).contains(&t) {
            bail!("Can't sample {} at {}", lane, t);
        }
        let seg = self.get_segment(lane.segment)?;
        let spec = seg
            .lanes
            .get(lane.offset)
            .with_context(|| format!("{} has no lane {}", seg.id, lane.offset))?;
        let center = seg.start_pt.lerp(seg.end_pt, t);
        Ok((center + seg.lateral() * spec.position, seg.direction()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lane_road() -> (Network, NodeID, NodeID, SegmentID) {
        let mut net = Network::new();
        let n1 = net.add_node(Pt3D::ground(0.0, 0.0), 2.0);
        let n2 = net.add_node(Pt3D::ground(30.0, 0.0), 5.0);
        let s = net
            .add_segment(
                n1,
                n2,
                vec![LaneSpec::driving(-1.5, 3.0), LaneSpec::driving(1.5, 3.0)],
            )
            .unwrap();
        (net, n1, n2, s)
    }

    #[test]
    fn segment_geometry_stops_at_nodes() {
        let (net, _, _, s) = two_lane_road();
        let seg = net.get_segment(s).unwrap();
        assert!(seg.start_pt.approx_eq(Pt3D::ground(2.0, 0.0), 1e-9));
        assert!(seg.end_pt.approx_eq(Pt3D::ground(25.0, 0.0), 1e-9));

        let lane = LaneID {
            segment: s,
            offset: 1,
        };
        let (pos, dir) = net.lane_position_and_direction(lane, 1.0).unwrap();
        assert!(pos.approx_eq(Pt3D::ground(25.0, 1.5), 1e-9));
        assert!(dir.approx_eq(Pt3D::ground(1.0, 0.0), 1e-9));

        assert!(net.lane_position_and_direction(lane, 1.5).is_err());
        let missing = LaneID {
            segment: s,
            offset: 7,
        };
        assert!(net.lane_position_and_direction(missing, 0.5).is_err());
    }

    #[test]
    fn node_membership() {
        let (mut net, n1, n2, s) = two_lane_road();
        let n3 = net.add_node(Pt3D::ground(30.0, 30.0), 5.0);
        let s2 = net.add_segment(n2, n3, vec![]).unwrap();
        assert_eq!(net.node_segments(n1).unwrap(), vec![s]);
        assert_eq!(net.node_segments(n2).unwrap(), vec![s, s2]);

        net.remove_segment(s);
        assert!(net.node_segments(n1).unwrap().is_empty());
        assert!(net.segment_info(s).is_err());
        assert!(net.node_segments(NodeID(99)).is_err());
    }

    #[test]
    fn corner_angles() {
        let (mut net, _, _, s) = two_lane_road();
        // Road along +X, so lane positions grow towards +Z and the corner runs towards -Z.
        let info = net.segment_info(s).unwrap();
        assert_eq!(info.corner_angle_start, 191);
        assert_eq!(info.corner_angle_end, 191);
        assert!(info.lanes.iter().all(|l| l.drivable));

        net.mut_segment(s).unwrap().corner_angle_end = Some(10);
        let info = net.segment_info(s).unwrap();
        assert_eq!(info.corner_angle_start, 191);
        assert_eq!(info.corner_angle_end, 10);
    }

    #[test]
    fn json_round_trip_and_validation() {
        let (net, _, _, _) = two_lane_road();
        let path = std::env::temp_dir()
            .join("road_network_test")
            .join("two_lanes.json");
        let path = path.to_string_lossy().to_string();
        abstutil::write_json(&path, &net).unwrap();
        let loaded = Network::load(&path).unwrap();
        assert_eq!(loaded.all_segments().count(), 1);

        let mut broken = net.clone();
        broken.mut_segment(SegmentID(0)).unwrap().end_node = NodeID(42);
        assert!(broken.validate().is_err());
    }
}
