//! Convex hull construction over the random seed nodes of a track.

use std::cmp::Ordering;

use super::{TrackEdge, TrackNode};

/// Boundary of a point set as a closed cycle of directed edges, plus every point that is not a
/// boundary vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HullResult {
    pub convex_edges: Vec<TrackEdge>,
    pub inner_nodes: Vec<TrackNode>,
}

pub trait ConvexHull {
    fn connect(&self, nodes: &[TrackNode]) -> HullResult;
}

/// Orientation of `a` relative to the directed line `c -> b`. Negative means the path
/// `c -> b -> a` turns clockwise in screen coordinates.
pub fn sign(a: TrackNode, b: TrackNode, c: TrackNode) -> i64 {
    (a.x() - c.x()) * (b.y() - c.y()) - (b.x() - c.x()) * (a.y() - c.y())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GrahamScan;

impl ConvexHull for GrahamScan {
    fn connect(&self, nodes: &[TrackNode]) -> HullResult {
        let mut unique = nodes.to_vec();
        unique.sort();
        unique.dedup();

        if unique.len() < 3 {
            return HullResult::default();
        }

        let pivot = unique
            .iter()
            .copied()
            .reduce(most_bottom)
            .unwrap_or_default();
        let sorted = sorted_by_angle(&unique, pivot);

        let mut stack = vec![pivot, sorted[0], sorted[1]];
        for &node in &sorted[2..] {
            while stack.len() >= 2
                && sign(node, stack[stack.len() - 1], stack[stack.len() - 2]) < 0
            {
                stack.pop();
            }
            stack.push(node);
        }

        let mut convex_edges = stack
            .windows(2)
            .map(|pair| TrackEdge::new(pair[0], pair[1]))
            .collect::<Vec<_>>();
        if let Some(&last) = stack.last() {
            convex_edges.push(TrackEdge::new(last, pivot));
        }

        let inner_nodes = unique
            .into_iter()
            .filter(|node| !stack.contains(node))
            .collect();

        HullResult {
            convex_edges,
            inner_nodes,
        }
    }
}

/// Largest y wins (screen bottom), ties broken by largest x.
fn most_bottom(lhs: TrackNode, rhs: TrackNode) -> TrackNode {
    if lhs.y() > rhs.y() || (lhs.y() == rhs.y() && lhs.x() > rhs.x()) {
        lhs
    } else {
        rhs
    }
}

/// Every node except the pivot, by descending polar angle around the pivot. Nodes sharing an
/// angle are ordered nearest first, except for the last angle which is ordered farthest first so
/// that collinear boundary points survive the scan.
fn sorted_by_angle(nodes: &[TrackNode], pivot: TrackNode) -> Vec<TrackNode> {
    let mut sorted = nodes
        .iter()
        .copied()
        .filter(|node| *node != pivot)
        .map(|node| (polar_angle(node, pivot), node))
        .collect::<Vec<_>>();

    sorted.sort_by(|(lhs_angle, lhs), (rhs_angle, rhs)| {
        rhs_angle
            .total_cmp(lhs_angle)
            .then_with(|| compare_distance(*lhs, *rhs, pivot))
    });

    if let Some(&(last_angle, _)) = sorted.last() {
        let tail = sorted
            .iter()
            .rev()
            .take_while(|(angle, _)| *angle == last_angle)
            .count();
        let len = sorted.len();
        sorted[len - tail..].reverse();
    }

    sorted.into_iter().map(|(_, node)| node).collect()
}

/// All other nodes lie on or above the pivot, so angles fall into `[-PI, 0]`. A node level with
/// the pivot can only be to its left and is mapped to `-PI`.
fn polar_angle(node: TrackNode, pivot: TrackNode) -> f64 {
    let angle = ((node.y() - pivot.y()) as f64).atan2((node.x() - pivot.x()) as f64);
    if angle > 0.0 {
        -std::f64::consts::PI
    } else {
        angle
    }
}

fn compare_distance(lhs: TrackNode, rhs: TrackNode, pivot: TrackNode) -> Ordering {
    let lhs = (lhs.x() - pivot.x()).pow(2) + (lhs.y() - pivot.y()).pow(2);
    let rhs = (rhs.x() - pivot.x()).pow(2) + (rhs.y() - pivot.y()).pow(2);
    lhs.cmp(&rhs)
}
