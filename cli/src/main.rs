//! Runs the intersection markup engine against a network saved as JSON, for debugging and for
//! producing primitives outside of a renderer.

#[macro_use]
extern crate log;

use anyhow::Result;
use serde::Serialize;
use structopt::StructOpt;

use geom::Pt3D;
use node_markup::{ConnectionKey, IntersectionMarkup, MarkupConfig, PointID, PointType};
use road_network::{Network, NodeID};

#[derive(StructOpt)]
#[structopt(name = "markup", about = "Lane markings at intersections")]
enum Command {
    /// Print every marker point at a node as JSON
    DumpPoints {
        /// The path to a network JSON file
        #[structopt(long)]
        network: String,
        /// The node to inspect
        #[structopt(long)]
        node: usize,
        /// Optional path to a JSON file overriding the markup settings
        #[structopt(long)]
        config: Option<String>,
    },
    /// Connect pairs of points at a node and write the resulting stroke primitives as JSON
    Render {
        #[structopt(long)]
        network: String,
        #[structopt(long)]
        node: usize,
        /// The path to a JSON list of connections, each one a pair of point IDs
        #[structopt(long)]
        connections: String,
        #[structopt(long)]
        config: Option<String>,
        /// Where to write the primitives. If omitted, they're printed.
        #[structopt(long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    match Command::from_args() {
        Command::DumpPoints {
            network,
            node,
            config,
        } => dump_points(network, NodeID(node), config),
        Command::Render {
            network,
            node,
            connections,
            config,
            output,
        } => render(network, NodeID(node), connections, config, output),
    }
}

fn load(
    network: &str,
    node: NodeID,
    config: Option<String>,
) -> Result<(Network, IntersectionMarkup)> {
    let cfg = match config {
        Some(path) => MarkupConfig::load(&path)?,
        None => MarkupConfig::default(),
    };
    let network = Network::load(network)?;
    let markup = IntersectionMarkup::new(node, cfg, &network)?;
    Ok((network, markup))
}

#[derive(Serialize)]
struct PointSummary {
    id: PointID,
    point_type: PointType,
    position: Pt3D,
    direction: Pt3D,
}

fn dump_points(network: String, node: NodeID, config: Option<String>) -> Result<()> {
    let (_, markup) = load(&network, node, config)?;
    let points: Vec<PointSummary> = markup
        .approaches()
        .flat_map(|a| a.points())
        .map(|pt| PointSummary {
            id: pt.id,
            point_type: pt.point_type,
            position: pt.position(),
            direction: pt.direction(),
        })
        .collect();
    println!("{}", abstutil::to_json(&points));
    Ok(())
}

fn render(
    network: String,
    node: NodeID,
    connections: String,
    config: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let (network, mut markup) = load(&network, node, config)?;
    let pairs: Vec<(PointID, PointID)> = abstutil::read_json(&connections)?;
    for (a, b) in pairs {
        let key = ConnectionKey::new(a, b);
        if markup.exists(key) {
            warn!("{} is listed twice; skipping", key);
            continue;
        }
        markup.toggle(key, &network)?;
    }

    let primitives = markup.stroke_primitives();
    if let Some(path) = output {
        abstutil::write_json(&path, primitives)?;
    } else {
        println!("{}", abstutil::to_json(primitives));
    }
    Ok(())
}
