//! Lane markings inside intersections. Each node gets marker points across the end of every
//! road touching it, and the user picks pairs of points to connect with dashed or solid lines.
//! The lines come out as a flat list of rectangles, ready to be batched up for drawing.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod approach;
mod config;
mod connection;
mod lanes;
mod markup;
mod point;
mod stroke;

pub use crate::approach::Approach;
pub use crate::config::{Color, MarkupConfig};
pub use crate::connection::{Connection, ConnectionKey, LineType};
pub use crate::lanes::{DriveLane, LaneBoundary};
pub use crate::markup::IntersectionMarkup;
pub use crate::point::{MarkerPoint, PointID, PointType, Side};
pub use crate::stroke::{dash_ranges, StrokePrimitive};
