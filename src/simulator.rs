//! Simulation of the cars on a generated track.
//!
//! The world advances on the fixed timestep schedule. The player's car executes the commands
//! resolved by the controller, all further cars are driven by an autopilot.

use bevy::{app::AppExit, prelude::*};
use rand::Rng;

use crate::{
    domain::{Autopilot, Driver, SimulationConfig, World, WorldError},
    resource::{ConfigRes, DriversRes, PlayerCommands, Session, WorldRes},
};

/// Index of the car controlled by keyboard and mouse.
pub const PLAYER: usize = 0;

const TICK_RATE: f64 = 60.0;
const MAX_GENERATION_ATTEMPTS: usize = 10;

pub struct Simulator {
    pub config: SimulationConfig,
}

impl Plugin for Simulator {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_RATE))
            .insert_resource(ConfigRes::from(self.config.clone()))
            .init_resource::<PlayerCommands>()
            .add_systems(PreStartup, set_up)
            .add_systems(FixedUpdate, simulate.run_if(resource_exists::<WorldRes>));
    }
}

pub fn create_world(config: &SimulationConfig) -> Result<World, WorldError> {
    create_world_with(config, &mut rand::rng())
}

/// Generates a world, drawing fresh randomness from `rng` for every attempt that failed on a
/// degenerate track.
pub fn create_world_with<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<World, WorldError> {
    let mut attempt = 1;
    loop {
        match World::generate(config.clone(), rng) {
            Ok(world) => return Ok(world),
            Err(WorldError::Track(error)) if attempt < MAX_GENERATION_ATTEMPTS => {
                warn!(attempt, %error, "track generation failed, retrying");
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

pub fn create_drivers(config: &SimulationConfig) -> DriversRes {
    (PLAYER + 1..config.cars)
        .map(|_| Box::new(Autopilot::default()) as Box<dyn Driver>)
        .collect::<Vec<_>>()
        .into()
}

fn set_up(mut commands: Commands, config: Res<ConfigRes>, mut exit: EventWriter<AppExit>) {
    match create_world(&config) {
        Ok(world) => {
            commands.insert_resource(WorldRes::from(world));
            commands.insert_resource(create_drivers(&config));
            commands.insert_resource(Session::default());
        }
        Err(error) => {
            error!(%error, "could not create world");
            exit.send(AppExit);
        }
    }
}

fn simulate(
    mut world: ResMut<WorldRes>,
    mut drivers: ResMut<DriversRes>,
    player_commands: Res<PlayerCommands>,
) {
    if world.is_finished() {
        return;
    }

    world.execute(PLAYER, &player_commands);
    for (offset, driver) in drivers.iter_mut().enumerate() {
        let idx = PLAYER + 1 + offset;
        let Some(car) = world.car(idx).filter(|c| c.is_active()) else {
            continue;
        };
        let commands = driver.commands(car, world.track());
        world.execute(idx, &commands);
    }

    world.tick();

    if world.is_finished() {
        info!(ticks = world.ticks(), "all cars left the track, press R to restart");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::TrackConfig;

    #[test]
    fn test_create_world() {
        let config = SimulationConfig {
            cars: 3,
            ..SimulationConfig::default()
        };
        let world = create_world(&config).unwrap();
        assert_eq!(world.cars().len(), 3);
        assert_eq!(create_drivers(&config).len(), 2);
    }

    #[test]
    fn test_create_world_does_not_retry_invalid_config() {
        let config = SimulationConfig {
            track: TrackConfig {
                seeds: 1,
                ..TrackConfig::default()
            },
            checkpoint_radius: -1.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            create_world(&config).err(),
            Some(WorldError::InvalidCheckpointRadius(-1.0))
        );
    }

    #[test]
    fn test_simulate_applies_player_commands() {
        let mut app = App::new();
        app.insert_resource(WorldRes::from(
            create_world(&SimulationConfig::default()).unwrap(),
        ))
        .init_resource::<DriversRes>()
        .insert_resource(PlayerCommands::from(vec![
            crate::domain::Command::Accelerate(0.3),
        ]))
        .add_systems(Update, simulate);

        app.update();

        let world = app.world.resource::<WorldRes>();
        assert_eq!(world.ticks(), 1);
        assert!((world.car(PLAYER).unwrap().velocity() - 0.3).abs() < 1e-9);
    }
}
