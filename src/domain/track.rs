//! Procedurally generated closed racing loop.
//!
//! Generation follows the classic hull-and-displace recipe: random seed nodes are wrapped in
//! their convex hull, one interior node is spliced in to break convexity, and every edge is then
//! split at a displaced midpoint.

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::{
    hull::sign, Angle, ConvexHull, Displacement, DisplacementError, GrahamScan, Position,
    TrackEdge, TrackNode,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TrackConfig {
    pub width: u32,
    pub height: u32,
    pub seeds: usize,
    /// Every `checkpoint_stride`-th node of the loop is a checkpoint.
    pub checkpoint_stride: usize,
    pub displacement: Displacement,
    pub subdivisions: usize,
    /// Edges shorter than this are not split any further.
    pub min_subdivision_length: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            seeds: 30,
            checkpoint_stride: 2,
            displacement: Displacement::default(),
            subdivisions: 1,
            min_subdivision_length: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    width: u32,
    height: u32,
    edges: Vec<TrackEdge>,
    nodes: Vec<TrackNode>,
    checkpoint_stride: usize,
    /// Checkpoints skipped at the start of the sequence.
    checkpoint_offset: usize,
}

impl Track {
    /// Displaced midpoints can fold the loop over itself. Such tracks are rejected with
    /// `TrackError::SelfIntersecting`, so callers retry with fresh randomness.
    pub fn generate<R: Rng + ?Sized>(config: &TrackConfig, rng: &mut R) -> Result<Self, TrackError> {
        Self::generate_with(config, &GrahamScan, rng)
    }

    pub fn generate_with<R: Rng + ?Sized>(
        config: &TrackConfig,
        hull: &dyn ConvexHull,
        rng: &mut R,
    ) -> Result<Self, TrackError> {
        if config.seeds < 3 {
            return Err(TrackError::TooFewSeeds(config.seeds));
        }
        if config.width < 8 || config.height < 8 {
            return Err(TrackError::WorldTooSmall(config.width, config.height));
        }
        config.displacement.validate()?;

        let seeds = seed_nodes(config, rng);
        let result = hull.connect(&seeds);
        if result.convex_edges.len() < 3 {
            return Err(TrackError::DegenerateHull);
        }

        let center = TrackNode::new(i64::from(config.width / 2), i64::from(config.height / 2));
        let mut edges = break_convexity(result.convex_edges, &result.inner_nodes, center)?;
        for _ in 0..config.subdivisions {
            edges = subdivide(&edges, config, rng);
        }

        let track = Self::from_edges(config.width, config.height, edges, config.checkpoint_stride)?;
        if let Some((lhs, rhs)) = crossing(&track.nodes) {
            return Err(TrackError::SelfIntersecting(lhs, rhs));
        }
        debug!(
            seeds = seeds.len(),
            nodes = track.nodes.len(),
            "generated track"
        );
        Ok(track)
    }

    /// Builds a track from directed edges that must form exactly one cycle.
    pub fn from_edges(
        width: u32,
        height: u32,
        edges: Vec<TrackEdge>,
        checkpoint_stride: usize,
    ) -> Result<Self, TrackError> {
        if checkpoint_stride == 0 {
            return Err(TrackError::InvalidCheckpointStride);
        }
        let nodes = walk(&edges)?;
        Ok(Self {
            width,
            height,
            edges,
            nodes,
            checkpoint_stride,
            checkpoint_offset: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn edges(&self) -> &[TrackEdge] {
        &self.edges
    }

    /// Loop nodes in driving order, starting with the source of the first edge.
    pub fn nodes(&self) -> &[TrackNode] {
        &self.nodes
    }

    pub fn checkpoint_stride(&self) -> usize {
        self.checkpoint_stride
    }

    pub fn checkpoint(&self, index: usize) -> TrackNode {
        let len = self.nodes.len();
        let index = (index % len + self.checkpoint_offset) % len;
        self.nodes[(index + 1) * self.checkpoint_stride % len]
    }

    /// Shifts the checkpoint sequence until its first checkpoint is no longer `blocked`. Leaves
    /// the sequence unshifted if every checkpoint is blocked.
    pub fn skip_checkpoints_while(&mut self, mut blocked: impl FnMut(TrackNode) -> bool) {
        self.checkpoint_offset = 0;
        let len = self.nodes.len();
        while self.checkpoint_offset < len && blocked(self.checkpoint(0)) {
            self.checkpoint_offset += 1;
        }
        if self.checkpoint_offset == len {
            self.checkpoint_offset = 0;
        }
    }

    pub fn starting_node(&self) -> TrackNode {
        self.edges[0].src()
    }

    /// Angle of the first edge in degrees, counter-clockwise with the y axis flipped.
    pub fn starting_angle(&self) -> f64 {
        let edge = self.edges[0];
        -(edge.dy() as f64).atan2(edge.dx() as f64).to_degrees()
    }

    /// Heading that points a car along the first edge.
    pub fn starting_heading(&self) -> Angle {
        Angle::from_deg(90.0 - self.starting_angle())
    }

    pub fn starting_position(&self) -> Position {
        self.starting_node().position()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum TrackError {
    #[error("at least 3 seed nodes are required, got {0}")]
    TooFewSeeds(usize),
    #[error("world of {0}x{1} pixels is too small for a track")]
    WorldTooSmall(u32, u32),
    #[error("convex hull of the seed nodes is degenerate")]
    DegenerateHull,
    #[error("no interior node available to break convexity")]
    NoInnerNode,
    #[error("checkpoint stride must be positive")]
    InvalidCheckpointStride,
    #[error("node {0:?} starts more than one edge")]
    DuplicateNode(TrackNode),
    #[error("edges {0:?} and {1:?} of the loop cross")]
    SelfIntersecting(TrackEdge, TrackEdge),
    #[error("edges do not form a single closed cycle ({visited} of {edges} edges reachable)")]
    BrokenCycle { visited: usize, edges: usize },
    #[error(transparent)]
    Displacement(#[from] DisplacementError),
}

fn seed_nodes<R: Rng + ?Sized>(config: &TrackConfig, rng: &mut R) -> Vec<TrackNode> {
    let offset_x = config.width / 8;
    let offset_y = config.height / 8;
    (0..config.seeds)
        .map(|_| {
            TrackNode::new(
                i64::from(rng.random_range(offset_x..config.width - offset_x)),
                i64::from(rng.random_range(offset_y..config.height - offset_y)),
            )
        })
        .collect()
}

/// Replaces the longest edge with a detour through the interior node closest to `center`.
fn break_convexity(
    mut edges: Vec<TrackEdge>,
    inner_nodes: &[TrackNode],
    center: TrackNode,
) -> Result<Vec<TrackEdge>, TrackError> {
    let chosen = inner_nodes
        .iter()
        .copied()
        .min_by(|lhs, rhs| lhs.distance(center).total_cmp(&rhs.distance(center)))
        .ok_or(TrackError::NoInnerNode)?;

    let (idx, longest) = edges
        .iter()
        .copied()
        .enumerate()
        .reduce(|best, candidate| {
            if candidate.1.length() > best.1.length() {
                candidate
            } else {
                best
            }
        })
        .ok_or(TrackError::DegenerateHull)?;

    edges.splice(
        idx..=idx,
        [
            TrackEdge::new(longest.src(), chosen),
            TrackEdge::new(chosen, longest.dst()),
        ],
    );
    Ok(edges)
}

fn subdivide<R: Rng + ?Sized>(
    edges: &[TrackEdge],
    config: &TrackConfig,
    rng: &mut R,
) -> Vec<TrackEdge> {
    let mut subdivided = Vec::with_capacity(edges.len() * 2);
    for edge in edges {
        if edge.length() < config.min_subdivision_length {
            subdivided.push(*edge);
            continue;
        }
        let mid = config.displacement.displace(edge.midpoint(), edge, rng);
        subdivided.push(TrackEdge::new(edge.src(), mid));
        subdivided.push(TrackEdge::new(mid, edge.dst()));
    }
    subdivided
}

/// First pair of non-adjacent loop segments that cross or touch.
fn crossing(nodes: &[TrackNode]) -> Option<(TrackEdge, TrackEdge)> {
    let n = nodes.len();
    let segment = |i: usize| TrackEdge::new(nodes[i], nodes[(i + 1) % n]);
    (0..n)
        .flat_map(|i| (i + 2..n).map(move |j| (i, j)))
        .filter(|&(i, j)| !(i == 0 && j == n - 1))
        .map(|(i, j)| (segment(i), segment(j)))
        .find(|&(lhs, rhs)| intersects(lhs, rhs))
}

fn intersects(lhs: TrackEdge, rhs: TrackEdge) -> bool {
    let side = |edge: TrackEdge, node: TrackNode| sign(node, edge.dst(), edge.src()).signum();
    let within = |edge: TrackEdge, node: TrackNode| {
        let (src, dst) = (edge.src(), edge.dst());
        (src.x().min(dst.x())..=src.x().max(dst.x())).contains(&node.x())
            && (src.y().min(dst.y())..=src.y().max(dst.y())).contains(&node.y())
    };

    let (d1, d2) = (side(lhs, rhs.src()), side(lhs, rhs.dst()));
    let (d3, d4) = (side(rhs, lhs.src()), side(rhs, lhs.dst()));
    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }
    // Collinear touches
    (d1 == 0 && within(lhs, rhs.src()))
        || (d2 == 0 && within(lhs, rhs.dst()))
        || (d3 == 0 && within(rhs, lhs.src()))
        || (d4 == 0 && within(rhs, lhs.dst()))
}

/// Follows edges source to destination from edge 0 until the loop closes.
fn walk(edges: &[TrackEdge]) -> Result<Vec<TrackNode>, TrackError> {
    let broken = |visited| TrackError::BrokenCycle {
        visited,
        edges: edges.len(),
    };

    let first = edges.first().ok_or_else(|| broken(0))?;
    let mut next = HashMap::with_capacity(edges.len());
    for edge in edges {
        if next.insert(edge.src(), edge.dst()).is_some() {
            return Err(TrackError::DuplicateNode(edge.src()));
        }
    }

    let start = first.src();
    let mut nodes = vec![start];
    let mut current = first.dst();
    while current != start {
        if nodes.len() >= edges.len() {
            return Err(broken(nodes.len()));
        }
        nodes.push(current);
        current = *next.get(&current).ok_or_else(|| broken(nodes.len()))?;
    }

    if nodes.len() != edges.len() {
        return Err(broken(nodes.len()));
    }
    Ok(nodes)
}
