//! Midpoint displacement strategies used while subdividing track edges.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

use super::{TrackEdge, TrackNode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Displacement {
    /// Offset each axis by a uniform random integer within `strength * edge length`.
    RandomBox { strength: f64 },
    /// Offset each axis by `N(0, sigma) * edge length`.
    Gaussian { sigma: f64 },
    /// Offset along the edge normal by `factor * edge length`.
    AlongNormal { factor: f64 },
}

impl Default for Displacement {
    fn default() -> Self {
        Displacement::AlongNormal { factor: 0.3 }
    }
}

impl Displacement {
    pub const fn random_box() -> Self {
        Displacement::RandomBox { strength: 0.5 }
    }

    pub const fn gaussian() -> Self {
        Displacement::Gaussian { sigma: 0.2 }
    }

    pub fn validate(&self) -> Result<(), DisplacementError> {
        match *self {
            Displacement::RandomBox { strength } if !(strength.is_finite() && strength >= 0.0) => {
                Err(DisplacementError::InvalidStrength(strength))
            }
            Displacement::Gaussian { sigma } if !(sigma.is_finite() && sigma >= 0.0) => {
                Err(DisplacementError::InvalidSigma(sigma))
            }
            Displacement::AlongNormal { factor } if !factor.is_finite() => {
                Err(DisplacementError::InvalidFactor(factor))
            }
            _ => Ok(()),
        }
    }

    pub fn displace<R: Rng + ?Sized>(
        &self,
        mid: TrackNode,
        edge: &TrackEdge,
        rng: &mut R,
    ) -> TrackNode {
        let length = edge.length();
        let (dx, dy) = match *self {
            Displacement::RandomBox { strength } => {
                let max_offset = (length * strength) as i64;
                (
                    rng.random_range(-max_offset..=max_offset),
                    rng.random_range(-max_offset..=max_offset),
                )
            }
            Displacement::Gaussian { sigma } => match Normal::new(0.0, sigma) {
                Ok(normal) => (
                    (normal.sample(rng) * length) as i64,
                    (normal.sample(rng) * length) as i64,
                ),
                Err(_) => (0, 0),
            },
            Displacement::AlongNormal { factor } => {
                if length == 0.0 {
                    return mid;
                }
                let nx = -(edge.dy() as f64) / length;
                let ny = edge.dx() as f64 / length;
                let offset = factor * length;
                ((nx * offset) as i64, (ny * offset) as i64)
            }
        };
        TrackNode::new(mid.x() + dx, mid.y() + dy)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum DisplacementError {
    #[error("random-box strength must be finite and non-negative, got {0}")]
    InvalidStrength(f64),
    #[error("gaussian sigma must be finite and non-negative, got {0}")]
    InvalidSigma(f64),
    #[error("normal offset factor must be finite, got {0}")]
    InvalidFactor(f64),
}
