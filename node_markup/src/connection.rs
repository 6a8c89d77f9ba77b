use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::Bezier3;
use road_network::SegmentID;

use crate::{stroke, MarkerPoint, MarkupConfig, PointID, StrokePrimitive};

/// An unordered pair of points. The two IDs are stored sorted, so (a, b) and (b, a) are the
/// same key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionKey {
    first: PointID,
    second: PointID,
}

impl ConnectionKey {
    pub fn new(a: PointID, b: PointID) -> ConnectionKey {
        if a <= b {
            ConnectionKey {
                first: a,
                second: b,
            }
        } else {
            ConnectionKey {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> PointID {
        self.first
    }

    pub fn second(&self) -> PointID {
        self.second
    }

    pub fn contains(&self, pt: PointID) -> bool {
        self.first == pt || self.second == pt
    }

    pub fn segments(&self) -> [SegmentID; 2] {
        [self.first.segment, self.second.segment]
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Connection from {} to {}", self.first, self.second)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum LineType {
    Solid,
    Dash,
}

/// A marking between two points: a curve and the primitives drawing it.
#[derive(Clone, Debug)]
pub struct Connection {
    pub key: ConnectionKey,
    /// Decided once, when the connection is created.
    pub line_type: LineType,
    start_offset: f64,
    end_offset: f64,

    /// The full curve between the two points, before trimming.
    trajectory: Bezier3,
    length: f64,
    dashes: Vec<StrokePrimitive>,
}

impl Connection {
    /// `start` and `end` must be the points named by `key`, in that order.
    pub fn new(
        key: ConnectionKey,
        start: &MarkerPoint,
        end: &MarkerPoint,
        cfg: &MarkupConfig,
    ) -> Connection {
        let line_type = if start.point_type.is_edge() && end.point_type.is_edge() {
            LineType::Solid
        } else {
            LineType::Dash
        };
        let mut conn = Connection {
            key,
            line_type,
            start_offset: 0.0,
            end_offset: 0.0,
            trajectory: Bezier3::new(start.position(), start.position(), end.position(), end.position()),
            length: 0.0,
            dashes: Vec::new(),
        };
        conn.update(start, end, cfg);
        conn
    }

    /// Refits the curve to the current point placement and regenerates the primitives.
    pub fn update(&mut self, start: &MarkerPoint, end: &MarkerPoint, cfg: &MarkupConfig) {
        debug_assert_eq!(start.id, self.key.first());
        debug_assert_eq!(end.id, self.key.second());

        self.trajectory = Bezier3::fit(
            start.position(),
            start.direction(),
            end.position(),
            end.direction(),
        );
        self.length = self.trajectory.length(cfg.min_angle_delta);

        let (drawn, drawn_length) = if self.start_offset == 0.0 && self.end_offset == 0.0 {
            (self.trajectory, self.length)
        } else if self.start_offset + self.end_offset >= self.length {
            self.dashes = Vec::new();
            return;
        } else {
            let t1 = self
                .trajectory
                .t_at_length(self.start_offset, cfg.min_angle_delta);
            let t2 = self
                .trajectory
                .t_at_length(self.length - self.end_offset, cfg.min_angle_delta);
            let drawn = self.trajectory.cut(t1, t2);
            (drawn, drawn.length(cfg.min_angle_delta))
        };

        self.dashes = match self.line_type {
            LineType::Dash => stroke::dashes(&drawn, drawn_length, cfg),
            LineType::Solid => stroke::solid(&drawn, cfg),
        };
    }

    /// How much to trim from each end of the curve, in meters. Takes effect on the next
    /// `update`.
    pub fn set_offsets(&mut self, start_offset: f64, end_offset: f64) -> Result<()> {
        if !(start_offset >= 0.0 && end_offset >= 0.0) {
            bail!(
                "Offsets for {} can't be negative: {}, {}",
                self.key,
                start_offset,
                end_offset
            );
        }
        self.start_offset = start_offset;
        self.end_offset = end_offset;
        Ok(())
    }

    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    pub fn end_offset(&self) -> f64 {
        self.end_offset
    }

    pub fn trajectory(&self) -> &Bezier3 {
        &self.trajectory
    }

    /// Arc length of the untrimmed curve.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn dashes(&self) -> &Vec<StrokePrimitive> {
        &self.dashes
    }
}
