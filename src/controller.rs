//! Controller steering the player's car.
//!
//! Keyboard and mouse state is resolved into commands once per frame. The simulator applies the
//! latest commands on every tick. Pressing R discards the session and generates a new track.

use bevy::prelude::*;

use crate::{
    domain::Command,
    resource::{ConfigRes, PlayerCommands, Session, WorldRes},
    simulator::{create_drivers, create_world},
};

const STEERING_FORCE: f64 = 0.5;
const BOOSTED_STEERING_FORCE: f64 = 1.0;
const THROTTLE: f64 = 0.3;
const BRAKE: f64 = 0.2;

pub struct Controller;

impl Plugin for Controller {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (control, restart));
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct InputState {
    left: bool,
    right: bool,
    boost: bool,
    throttle: bool,
    brake: bool,
}

impl InputState {
    fn commands(&self) -> Vec<Command> {
        let force = if self.boost {
            BOOSTED_STEERING_FORCE
        } else {
            STEERING_FORCE
        };
        let steering = match (self.left, self.right) {
            (true, false) => Command::SteerLeft(force),
            (false, true) => Command::SteerRight(force),
            _ => Command::CenterSteering,
        };
        let throttle = if self.throttle {
            Command::Accelerate(THROTTLE)
        } else if self.brake {
            Command::Brake(BRAKE)
        } else {
            Command::Idle
        };
        vec![steering, throttle]
    }
}

fn control(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut player_commands: ResMut<PlayerCommands>,
) {
    let input = InputState {
        left: keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft),
        right: keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight),
        boost: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        throttle: buttons.pressed(MouseButton::Left) || keys.pressed(KeyCode::KeyW),
        brake: buttons.pressed(MouseButton::Right) || keys.pressed(KeyCode::KeyS),
    };
    let commands = PlayerCommands::from(input.commands());
    if *player_commands != commands {
        *player_commands = commands;
    }
}

fn restart(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<ConfigRes>,
    session: Option<Res<Session>>,
    mut commands: Commands,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }

    match create_world(&config) {
        Ok(world) => {
            commands.insert_resource(WorldRes::from(world));
            commands.insert_resource(create_drivers(&config));
            let generation = session.map_or(0, |s| s.generation + 1);
            commands.insert_resource(Session { generation });
            info!(generation, "restarted on a new track");
        }
        Err(error) => error!(%error, "could not create world, keeping the current one"),
    }
}
