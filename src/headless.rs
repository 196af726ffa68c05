//! Races of autopilot drivers without window or renderer.

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{
    domain::{Autopilot, Driver, Fitness, SimulationConfig, WorldError},
    simulator::create_world_with,
};

#[derive(Clone, Debug, PartialEq)]
pub struct CarResult {
    pub checkpoints: usize,
    pub active: bool,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub seed: u64,
    pub ticks: u64,
    pub cars: Vec<CarResult>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed {}, {} ticks", self.seed, self.ticks)?;
        writeln!(f, "car  checkpoints  active     score")?;
        for (idx, car) in self.cars.iter().enumerate() {
            writeln!(
                f,
                "{idx:>3}  {:>11}  {:>6}  {:>8.2}",
                car.checkpoints,
                if car.active { "yes" } else { "no" },
                car.score
            )?;
        }
        Ok(())
    }
}

/// Generates the track for `seed` and lets one autopilot per car race on it for at most
/// `max_ticks` ticks.
pub fn run(config: &SimulationConfig, seed: u64, max_ticks: u64) -> Result<Report, WorldError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut world = create_world_with(config, &mut rng)?;
    let mut drivers = (0..config.cars)
        .map(|_| Box::new(Autopilot::default()) as Box<dyn Driver>)
        .collect::<Vec<_>>();

    let ticks = world.run(&mut drivers, max_ticks);

    let cars = world
        .cars()
        .iter()
        .zip(world.scores(&Fitness::default()))
        .map(|(car, score)| CarResult {
            checkpoints: car.checkpoints_matched(),
            active: car.is_active(),
            score,
        })
        .collect();
    info!(seed, ticks, active = world.active_cars(), "headless race finished");

    Ok(Report { seed, ticks, cars })
}
