//! Ring of distance rays rigidly attached to a car.

use thiserror::Error;

use super::{Angle, Position};

#[derive(Clone, Debug, PartialEq)]
pub struct SensorConfig {
    /// Ray directions in degrees relative to the car heading; 0 points straight ahead.
    pub ray_angles: Vec<f64>,
    pub probe_start: f64,
    pub probe_step: f64,
    pub max_ray_length: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_angles: (0..8).map(|i| f64::from(i) * 45.0).collect(),
            probe_start: 8.0,
            probe_step: 2.0,
            max_ray_length: 96.0,
        }
    }
}

impl SensorConfig {
    pub fn validate(&self) -> Result<(), SensorError> {
        if !(self.probe_step > 0.0) {
            return Err(SensorError::InvalidProbeStep(self.probe_step));
        }
        if !(self.probe_start > 0.0 && self.max_ray_length >= self.probe_start) {
            return Err(SensorError::InvalidRayLength {
                probe_start: self.probe_start,
                max_ray_length: self.max_ray_length,
            });
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SensorError {
    #[error("probe step must be positive, got {0}")]
    InvalidProbeStep(f64),
    #[error("max ray length {max_ray_length} must be at least the probe start {probe_start}")]
    InvalidRayLength {
        probe_start: f64,
        max_ray_length: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    relative_angle: Angle,
    origin: Position,
    angle: Angle,
    hit: Option<Position>,
    length: Option<f64>,
}

impl Ray {
    pub fn new(relative_angle: Angle) -> Self {
        Self {
            relative_angle,
            origin: Position::default(),
            angle: relative_angle,
            hit: None,
            length: None,
        }
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    /// World angle: car heading plus the relative angle.
    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn hit(&self) -> Option<Position> {
        self.hit
    }

    pub fn length(&self) -> Option<f64> {
        self.length
    }

    pub fn attach(&mut self, origin: Position, heading: Angle) {
        self.origin = origin;
        self.angle = Angle::from_deg((heading + self.relative_angle).to_deg());
        self.hit = None;
        self.length = None;
    }

    pub fn set_hit(&mut self, hit: Position, length: f64) {
        self.hit = Some(hit);
        self.length = Some(length);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sensors {
    rays: Vec<Ray>,
}

impl Sensors {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            rays: config
                .ray_angles
                .iter()
                .map(|deg| Ray::new(Angle::from_deg(*deg)))
                .collect(),
        }
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn rays_mut(&mut self) -> &mut [Ray] {
        &mut self.rays
    }

    pub fn attach(&mut self, origin: Position, heading: Angle) {
        for ray in &mut self.rays {
            ray.attach(origin, heading);
        }
    }
}
