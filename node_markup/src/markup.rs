use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};

use geom::Ray;
use road_network::{NetworkSource, NodeID, SegmentID};

use crate::lanes::internal_error;
use crate::{
    Approach, Connection, ConnectionKey, MarkerPoint, MarkupConfig, PointID, StrokePrimitive,
};

/// All of the markings at one node: an approach per connected segment, the connections the
/// user has chosen, and the primitives to draw them.
///
/// Every change is built off to the side and only swapped in once it fully succeeds, so a
/// failure leaves the last good state in place.
pub struct IntersectionMarkup {
    node: NodeID,
    cfg: MarkupConfig,
    approaches: BTreeMap<SegmentID, Approach>,
    connections: BTreeMap<ConnectionKey, Connection>,
    dashes: Vec<StrokePrimitive>,
}

struct Rebuilt {
    approaches: BTreeMap<SegmentID, Approach>,
    connections: BTreeMap<ConnectionKey, Connection>,
    dashes: Vec<StrokePrimitive>,
}

impl IntersectionMarkup {
    pub fn new(
        node: NodeID,
        cfg: MarkupConfig,
        src: &dyn NetworkSource,
    ) -> Result<IntersectionMarkup> {
        cfg.validate()?;
        let mut markup = IntersectionMarkup {
            node,
            cfg,
            approaches: BTreeMap::new(),
            connections: BTreeMap::new(),
            dashes: Vec::new(),
        };
        markup.refresh(src)?;
        Ok(markup)
    }

    /// Re-reads the node's segments, updating every approach and connection. Connections
    /// touching a segment that's gone are dropped. On failure, nothing changes.
    pub fn refresh(&mut self, src: &dyn NetworkSource) -> Result<()> {
        let connections = self.connections.clone();
        self.commit(src, connections, None)
    }

    /// Removes the connection if it exists, otherwise creates it. The points must both exist
    /// and be different. Adding fails if either point's approach has to be rebuilt, since its
    /// points may have moved to different indices; refresh and pick the points again.
    pub fn toggle(&mut self, key: ConnectionKey, src: &dyn NetworkSource) -> Result<()> {
        if key.first() == key.second() {
            bail!("Can't connect {} to itself", key.first());
        }
        let mut connections = self.connections.clone();
        if connections.remove(&key).is_some() {
            info!("Removing {} at {}", key, self.node);
            self.commit(src, connections, None)
        } else {
            let start = self.point(key.first())?;
            let end = self.point(key.second())?;
            connections.insert(key, Connection::new(key, start, end, &self.cfg));
            info!("Adding {} at {}", key, self.node);
            self.commit(src, connections, Some(key))
        }
    }

    /// Trims each end of an existing connection by some distance.
    pub fn set_offsets(
        &mut self,
        key: ConnectionKey,
        start_offset: f64,
        end_offset: f64,
        src: &dyn NetworkSource,
    ) -> Result<()> {
        let mut connections = self.connections.clone();
        connections
            .get_mut(&key)
            .ok_or_else(|| anyhow!("{} doesn't exist at {}", key, self.node))?
            .set_offsets(start_offset, end_offset)?;
        self.commit(src, connections, Some(key))
    }

    pub fn exists(&self, key: ConnectionKey) -> bool {
        self.connections.contains_key(&key)
    }

    pub fn node(&self) -> NodeID {
        self.node
    }

    pub fn config(&self) -> &MarkupConfig {
        &self.cfg
    }

    pub fn approaches(&self) -> impl Iterator<Item = &Approach> {
        self.approaches.values()
    }

    pub fn approach(&self, segment: SegmentID) -> Option<&Approach> {
        self.approaches.get(&segment)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection(&self, key: ConnectionKey) -> Option<&Connection> {
        self.connections.get(&key)
    }

    pub fn point(&self, id: PointID) -> Result<&MarkerPoint> {
        find_point(&self.approaches, id)
            .ok_or_else(|| anyhow!("{} doesn't exist at {}", id, self.node))
    }

    /// Everything to draw, from all connections. Replaced wholesale by every successful change.
    pub fn stroke_primitives(&self) -> &Vec<StrokePrimitive> {
        &self.dashes
    }

    /// The closest point whose box the ray hits.
    pub fn point_under_ray(&self, ray: &Ray) -> Option<PointID> {
        let mut best: Option<(f64, PointID)> = None;
        for pt in self.approaches.values().flat_map(|a| a.points()) {
            if let Some(dist) = pt.intersect_ray(ray) {
                if best.map(|(d, _)| dist < d).unwrap_or(true) {
                    best = Some((dist, pt.id));
                }
            }
        }
        best.map(|(_, id)| id)
    }

    /// Rebuilds with the given connections and swaps the result in. If `keep` is dropped along
    /// the way, nothing changes.
    fn commit(
        &mut self,
        src: &dyn NetworkSource,
        connections: BTreeMap<ConnectionKey, Connection>,
        keep: Option<ConnectionKey>,
    ) -> Result<()> {
        debug!("Refreshing markup at {}", self.node);
        let result = self.rebuild(src, connections).and_then(|rebuilt| match keep {
            Some(key) if !rebuilt.connections.contains_key(&key) => Err(anyhow!(
                "{} at {} uses points that changed since the last refresh",
                key,
                self.node
            )),
            _ => Ok(rebuilt),
        });
        match result {
            Ok(rebuilt) => {
                self.approaches = rebuilt.approaches;
                self.connections = rebuilt.connections;
                self.dashes = rebuilt.dashes;
                debug!(
                    "{} has {} approaches, {} connections, {} primitives",
                    self.node,
                    self.approaches.len(),
                    self.connections.len(),
                    self.dashes.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!("Keeping the old markup at {}: {:#}", self.node, err);
                Err(err)
            }
        }
    }

    fn rebuild(
        &self,
        src: &dyn NetworkSource,
        mut connections: BTreeMap<ConnectionKey, Connection>,
    ) -> Result<Rebuilt> {
        let mut approaches = BTreeMap::new();
        // Segments whose old points can't be trusted anymore
        let mut replaced = BTreeSet::new();
        for segment in src.node_segments(self.node)? {
            let info = src.segment_info(segment)?;
            let approach = match self.approaches.get(&segment) {
                Some(existing) if existing.matches(&info) => {
                    let mut approach = existing.clone();
                    approach.update(src, &self.cfg).with_context(|| {
                        format!("Updating the approach of {} into {}", segment, self.node)
                    })?;
                    approach
                }
                existing => {
                    if existing.is_some() {
                        replaced.insert(segment);
                    }
                    Approach::new(self.node, segment, src, &self.cfg)?
                }
            };
            approaches.insert(segment, approach);
        }

        connections.retain(|key, _| {
            let keep = key
                .segments()
                .iter()
                .all(|s| approaches.contains_key(s) && !replaced.contains(s))
                && find_point(&approaches, key.first()).is_some()
                && find_point(&approaches, key.second()).is_some();
            if !keep {
                debug!("Dropping {} at {}", key, self.node);
            }
            keep
        });

        let mut dashes = Vec::new();
        for (key, conn) in connections.iter_mut() {
            let start = find_point(&approaches, key.first())
                .ok_or_else(|| internal_error("a kept connection lost its start"))?;
            let end = find_point(&approaches, key.second())
                .ok_or_else(|| internal_error("a kept connection lost its end"))?;
            conn.update(start, end, &self.cfg);
            dashes.extend(conn.dashes().iter().cloned());
        }

        Ok(Rebuilt {
            approaches,
            connections,
            dashes,
        })
    }
}

fn find_point(approaches: &BTreeMap<SegmentID, Approach>, id: PointID) -> Option<&MarkerPoint> {
    approaches.get(&id.segment)?.point(id.idx)
}
