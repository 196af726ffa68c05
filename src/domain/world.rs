//! A simulation session: one track, its mask and the cars racing on it.
//!
//! Each tick first advances the kinematics of every active car and only then runs the collider,
//! so collision and progress decisions always see the positions of the current tick.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::{
    Car, CarConfig, Checkpoint, Collider, ColorLookup, Command, Driver, Fitness, HasCollision,
    MaskStyle, SensorConfig, SensorError, Track, TrackConfig, TrackError, TrackMask,
};

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub track: TrackConfig,
    pub car: CarConfig,
    pub sensor: SensorConfig,
    pub mask: MaskStyle,
    pub checkpoint_radius: f64,
    /// Number of cars spawned on the starting node.
    pub cars: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            track: TrackConfig::default(),
            car: CarConfig::default(),
            sensor: SensorConfig::default(),
            mask: MaskStyle::default(),
            checkpoint_radius: 30.0,
            cars: 1,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        self.sensor.validate()?;
        if !(self.checkpoint_radius > 0.0) {
            return Err(WorldError::InvalidCheckpointRadius(self.checkpoint_radius));
        }
        if !(self.mask.track_width > 0.0) {
            return Err(WorldError::InvalidTrackWidth(self.mask.track_width));
        }
        if self.mask.track_color.same_color(&self.mask.background_color) {
            return Err(WorldError::IndistinctColors);
        }
        if self.cars == 0 {
            return Err(WorldError::NoCars);
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum WorldError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error("checkpoint radius must be positive, got {0}")]
    InvalidCheckpointRadius(f64),
    #[error("track width must be positive, got {0}")]
    InvalidTrackWidth(f64),
    #[error("track and background colors must differ")]
    IndistinctColors,
    #[error("at least one car is required")]
    NoCars,
    #[error("color lookup of {actual:?} pixels does not match the {expected:?} world")]
    LookupSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

pub struct World {
    track: Track,
    collider: Collider,
    cars: Vec<Car>,
    ticks: u64,
}

impl World {
    /// Generates a fresh track and renders its mask.
    pub fn generate<R: Rng + ?Sized>(
        config: SimulationConfig,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let track = Track::generate(&config.track, rng)?;
        let mask = TrackMask::render(&track, &config.mask);
        Self::new(config, track, Box::new(mask))
    }

    /// Builds a session from an existing track and a lookup rendered from it. Checkpoints that
    /// already overlap the spawned cars are moved to the end of the checkpoint sequence.
    pub fn new(
        config: SimulationConfig,
        mut track: Track,
        lookup: Box<dyn ColorLookup>,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let expected = (track.width(), track.height());
        let actual = (lookup.width(), lookup.height());
        if expected != actual {
            return Err(WorldError::LookupSizeMismatch { expected, actual });
        }

        let collider = Collider::new(
            lookup,
            config.mask.track_color,
            config.sensor.clone(),
            config.checkpoint_radius,
        );
        let cars = (0..config.cars)
            .map(|_| {
                Car::new(
                    track.starting_position(),
                    track.starting_heading(),
                    config.car.clone(),
                    &config.sensor,
                )
            })
            .collect::<Vec<_>>();

        if let Some(car) = cars.first() {
            let radius = config.checkpoint_radius;
            track.skip_checkpoints_while(|node| {
                Checkpoint::new(node.position(), radius).has_collision(car)
            });
        }

        info!(
            nodes = track.nodes().len(),
            cars = cars.len(),
            heading = track.starting_heading().to_deg(),
            "created world"
        );

        Ok(Self {
            track,
            collider,
            cars,
            ticks: 0,
        })
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    pub fn lookup(&self) -> &dyn ColorLookup {
        self.collider.lookup()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, idx: usize) -> Option<&Car> {
        self.cars.get(idx)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn active_cars(&self) -> usize {
        self.cars.iter().filter(|c| c.is_active()).count()
    }

    pub fn is_finished(&self) -> bool {
        self.active_cars() == 0
    }

    /// Applies commands to an active car; inactive or unknown cars ignore them.
    pub fn execute(&mut self, idx: usize, commands: &[Command]) {
        if let Some(car) = self.cars.get_mut(idx).filter(|c| c.is_active()) {
            for command in commands {
                car.execute(*command);
            }
        }
    }

    pub fn tick(&mut self) {
        for car in self.cars.iter_mut().filter(|c| c.is_active()) {
            car.update();
        }
        self.collider.update(&self.track, &mut self.cars);
        self.ticks += 1;
    }

    /// Lets each driver control the car with the same index until `max_ticks` ticks have run or
    /// no car is active anymore. Returns the number of ticks run.
    pub fn run(&mut self, drivers: &mut [Box<dyn Driver>], max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_finished() {
            for (idx, driver) in drivers.iter_mut().enumerate() {
                let Some(car) = self.cars.get(idx).filter(|c| c.is_active()) else {
                    continue;
                };
                let commands = driver.commands(car, &self.track);
                self.execute(idx, &commands);
            }
            self.tick();
            ticks += 1;
        }
        debug!(ticks, active = self.active_cars(), "run finished");
        ticks
    }

    pub fn scores(&self, fitness: &Fitness) -> Vec<f64> {
        self.cars.iter().map(|c| fitness.score(c)).collect()
    }
}
