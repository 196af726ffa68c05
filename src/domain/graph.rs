//! Track skeleton vertices and segments.

use super::Position;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TrackNode {
    x: i64,
    y: i64,
}

impl TrackNode {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn distance(&self, other: TrackNode) -> f64 {
        TrackEdge::new(*self, other).length()
    }

    pub fn position(&self) -> Position {
        Position::new(self.x as f64, self.y as f64)
    }
}

impl From<TrackNode> for Position {
    fn from(value: TrackNode) -> Self {
        value.position()
    }
}

/// Directed segment between two skeleton vertices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TrackEdge {
    src: TrackNode,
    dst: TrackNode,
}

impl TrackEdge {
    pub const fn new(src: TrackNode, dst: TrackNode) -> Self {
        Self { src, dst }
    }

    pub fn src(&self) -> TrackNode {
        self.src
    }

    pub fn dst(&self) -> TrackNode {
        self.dst
    }

    pub fn dx(&self) -> i64 {
        self.dst.x - self.src.x
    }

    pub fn dy(&self) -> i64 {
        self.dst.y - self.src.y
    }

    pub fn length(&self) -> f64 {
        (self.dx() as f64).hypot(self.dy() as f64)
    }

    /// Midpoint rounded towards negative infinity.
    pub fn midpoint(&self) -> TrackNode {
        TrackNode::new(
            (self.src.x + self.dst.x).div_euclid(2),
            (self.src.y + self.dst.y).div_euclid(2),
        )
    }
}
