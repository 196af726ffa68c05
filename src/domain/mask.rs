//! Rasterized track mask and the per-pixel color lookup contract used for collision sampling.
//!
//! The mask must be drawn with hard edges: collision checks compare colors exactly, so any
//! anti-aliased boundary pixel would read as off-track.

use nalgebra::{Matrix4, Matrix4x2, RowVector4};
use super::{Position, Track, TrackNode};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Exact RGB comparison; alpha is ignored.
    pub fn same_color(&self, other: &Rgba) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Read-only per-pixel color source over the rendered track.
pub trait ColorLookup: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// `None` outside the image.
    fn color_at(&self, x: i64, y: i64) -> Option<Rgba>;

    fn sample(&self, position: Position) -> Option<Rgba> {
        let (x, y) = pixel(position);
        self.color_at(x, y)
    }

    /// Row-major RGBA8 bytes, e.g. for uploading as a texture.
    fn to_rgba_bytes(&self) -> Vec<u8> {
        (0..i64::from(self.height()))
            .flat_map(|y| (0..i64::from(self.width())).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                let p = self.color_at(x, y).unwrap_or_default();
                [p.r, p.g, p.b, p.a]
            })
            .collect()
    }
}

fn pixel(position: Position) -> (i64, i64) {
    (position.x().floor() as i64, position.y().floor() as i64)
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaskStyle {
    pub track_width: f64,
    pub track_color: Rgba,
    pub background_color: Rgba,
}

impl Default for MaskStyle {
    fn default() -> Self {
        Self {
            track_width: 64.0,
            track_color: Rgba::new(211, 176, 131, 255),
            background_color: Rgba::new(51, 51, 51, 255),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackMask {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl TrackMask {
    pub fn from_fn(width: u32, height: u32, color: impl Fn(u32, u32) -> Rgba) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| color(x, y))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Draws the track loop as a closed Catmull-Rom spline stroked with the track width.
    pub fn render(track: &Track, style: &MaskStyle) -> Self {
        let mut mask = Self::from_fn(track.width(), track.height(), |_, _| {
            style.background_color
        });
        let samples = spline_samples(track.nodes());
        let radius = style.track_width / 2.0;
        for pair in samples.windows(2) {
            mask.stamp_capsule(pair[0], pair[1], radius, style.track_color);
        }
        mask
    }

    fn stamp_capsule(&mut self, a: Position, b: Position, radius: f64, color: Rgba) {
        let clamp_x = |v: f64| v.clamp(0.0, f64::from(self.width)) as u32;
        let clamp_y = |v: f64| v.clamp(0.0, f64::from(self.height)) as u32;
        let x_min = clamp_x((a.x().min(b.x()) - radius).floor());
        let x_max = clamp_x((a.x().max(b.x()) + radius).ceil());
        let y_min = clamp_y((a.y().min(b.y()) - radius).floor());
        let y_max = clamp_y((a.y().max(b.y()) + radius).ceil());

        for y in y_min..y_max {
            for x in x_min..x_max {
                let center = Position::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if distance_to_segment(center, a, b) <= radius {
                    let idx = y as usize * self.width as usize + x as usize;
                    self.pixels[idx] = color;
                }
            }
        }
    }
}

impl ColorLookup for TrackMask {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn color_at(&self, x: i64, y: i64) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }
}

/// Spacing in pixels between consecutive spline samples.
const SAMPLE_SPACING: f64 = 4.0;

/// Points along the closed uniform Catmull-Rom spline through `nodes`, ending where it began.
fn spline_samples(nodes: &[TrackNode]) -> Vec<Position> {
    #[rustfmt::skip]
    let basis = Matrix4::new(
         0.0,  2.0,  0.0,  0.0,
        -1.0,  0.0,  1.0,  0.0,
         2.0, -5.0,  4.0, -1.0,
        -1.0,  3.0, -3.0,  1.0,
    ) * 0.5;

    let n = nodes.len();
    let mut samples = vec![];
    for i in 0..n {
        let [p0, p1, p2, p3] =
            [n - 1, 0, 1, 2].map(|offset| nodes[(i + offset) % n].position());
        #[rustfmt::skip]
        let control = Matrix4x2::new(
            p0.x(), p0.y(),
            p1.x(), p1.y(),
            p2.x(), p2.y(),
            p3.x(), p3.y(),
        );
        let coefficients = basis * control;
        let steps = (p1.distance(p2) / SAMPLE_SPACING).ceil().max(1.0) as usize;
        for step in 0..steps {
            let t = step as f64 / steps as f64;
            let point = RowVector4::new(1.0, t, t * t, t * t * t) * coefficients;
            samples.push(Position::new(point[0], point[1]));
        }
    }
    if let Some(&first) = samples.first() {
        samples.push(first);
    }
    samples
}

fn distance_to_segment(point: Position, a: Position, b: Position) -> f64 {
    let ab = b - a;
    let length_squared = ab.x().powi(2) + ab.y().powi(2);
    if length_squared == 0.0 {
        return point.distance(a);
    }
    let ap = point - a;
    let t = ((ap.x() * ab.x() + ap.y() * ab.y()) / length_squared).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
