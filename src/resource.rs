//! The resource module encapsulates domain entities for use with Bevy.

use std::ops::{Deref, DerefMut};

use bevy::ecs::system::Resource;

use crate::domain;

#[derive(Resource)]
pub struct WorldRes(domain::World);

impl Deref for WorldRes {
    type Target = domain::World;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for WorldRes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<domain::World> for WorldRes {
    fn from(value: domain::World) -> Self {
        Self(value)
    }
}

#[derive(Resource)]
pub struct ConfigRes(domain::SimulationConfig);

impl Deref for ConfigRes {
    type Target = domain::SimulationConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<domain::SimulationConfig> for ConfigRes {
    fn from(value: domain::SimulationConfig) -> Self {
        Self(value)
    }
}

/// Drivers of the cars following the player's car, in car order.
#[derive(Resource, Default)]
pub struct DriversRes(Vec<Box<dyn domain::Driver>>);

impl Deref for DriversRes {
    type Target = Vec<Box<dyn domain::Driver>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DriversRes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Box<dyn domain::Driver>>> for DriversRes {
    fn from(value: Vec<Box<dyn domain::Driver>>) -> Self {
        Self(value)
    }
}

/// Commands resolved from the current input state, applied to the player's car every tick.
#[derive(Resource, Default, Debug, PartialEq)]
pub struct PlayerCommands(Vec<domain::Command>);

impl Deref for PlayerCommands {
    type Target = Vec<domain::Command>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<domain::Command>> for PlayerCommands {
    fn from(value: Vec<domain::Command>) -> Self {
        Self(value)
    }
}

/// Counts generated worlds, so that dependent state can be rebuilt after a restart.
#[derive(Resource, Default, Debug)]
pub struct Session {
    pub generation: u64,
}
