//! The road network as the markup engine sees it: nodes, the segments touching them, and the
//! lanes of each segment. Anything able to answer the questions in `NetworkSource` can drive
//! the engine; `Network` is a simple in-memory implementation.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod network;
mod objects;

use anyhow::Result;

use geom::Pt3D;

pub use crate::network::Network;
pub use crate::objects::{
    LaneID, LaneInfo, LaneSpec, LaneType, Node, NodeID, Segment, SegmentID, SegmentInfo,
};

/// Read-only queries against a network snapshot.
pub trait NetworkSource {
    /// All segments with one end at this node, in a stable order.
    fn node_segments(&self, node: NodeID) -> Result<Vec<SegmentID>>;

    /// The static description of a segment: endpoints, direction flag, corner angles and lanes.
    fn segment_info(&self, segment: SegmentID) -> Result<SegmentInfo>;

    /// Samples a lane's center at `t` in [0, 1], from the segment's start to its end. Returns
    /// the position and the unit direction of travel along the segment.
    fn lane_position_and_direction(&self, lane: LaneID, t: f64) -> Result<(Pt3D, Pt3D)>;
}
