//! Test utils.

use crate::domain::{MaskStyle, Rgba, Track, TrackEdge, TrackError, TrackMask, TrackNode};

pub const TRACK: Rgba = Rgba::new(211, 176, 131, 255);
pub const BACKGROUND: Rgba = Rgba::new(51, 51, 51, 255);

/// Mask with a horizontal band of track color covering the rows `top..bottom`.
pub fn strip_mask(width: u32, height: u32, top: u32, bottom: u32) -> TrackMask {
    TrackMask::from_fn(width, height, |_, y| {
        if (top..bottom).contains(&y) {
            TRACK
        } else {
            BACKGROUND
        }
    })
}

pub fn open_mask(width: u32, height: u32) -> TrackMask {
    TrackMask::from_fn(width, height, |_, _| TRACK)
}

/// Track through an ordered loop of nodes; the last node connects back to the first.
pub fn loop_track(
    width: u32,
    height: u32,
    nodes: &[TrackNode],
    checkpoint_stride: usize,
) -> Result<Track, TrackError> {
    let edges = nodes
        .iter()
        .zip(nodes.iter().cycle().skip(1))
        .map(|(src, dst)| TrackEdge::new(*src, *dst))
        .collect();
    Track::from_edges(width, height, edges, checkpoint_stride)
}

/// Node loop along the straight line `y = 50` and back.
pub fn straight_track(width: u32, stride: usize) -> Track {
    let nodes = [(10, 50), (200, 50), (width as i64 - 10, 50), (200, 51)]
        .map(|(x, y)| TrackNode::new(x, y));
    loop_track(width, 100, &nodes, stride).unwrap()
}

pub fn square_track() -> Track {
    let nodes = [(100, 100), (300, 100), (300, 300), (100, 300)].map(|(x, y)| TrackNode::new(x, y));
    loop_track(400, 400, &nodes, 1).unwrap()
}

pub fn square_mask() -> TrackMask {
    TrackMask::render(&square_track(), &MaskStyle::default())
}
