//! Command line options.

use clap::{Parser, ValueEnum};

use crate::domain::{Displacement, SimulationConfig, TrackConfig};

/// Cars in a session: the player's car plus autopilots.
const CARS: usize = 4;
const TICKS: u64 = 3600;

#[derive(Parser, Debug)]
#[command(name = "racetrack")]
#[command(about = "Top-down racing on procedurally generated tracks")]
pub struct Args {
    /// Number of cars; in a window, car 0 is driven by the player
    #[arg(long, default_value_t = CARS)]
    pub cars: usize,

    /// How the midpoints of subdivided track edges are displaced
    #[arg(long, value_enum, default_value_t = DisplacementKind::Normal)]
    pub displacement: DisplacementKind,

    /// Let autopilots race without a window and print their scores
    #[arg(long)]
    pub headless: bool,

    /// Seed of the headless track; drawn at random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tick budget of a headless run
    #[arg(long, default_value_t = TICKS)]
    pub ticks: u64,
}

impl Args {
    pub fn config(&self) -> SimulationConfig {
        SimulationConfig {
            track: TrackConfig {
                displacement: self.displacement.into(),
                ..TrackConfig::default()
            },
            cars: self.cars,
            ..SimulationConfig::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum DisplacementKind {
    RandomBox,
    Gaussian,
    Normal,
}

impl From<DisplacementKind> for Displacement {
    fn from(kind: DisplacementKind) -> Self {
        match kind {
            DisplacementKind::RandomBox => Displacement::random_box(),
            DisplacementKind::Gaussian => Displacement::gaussian(),
            DisplacementKind::Normal => Displacement::default(),
        }
    }
}
