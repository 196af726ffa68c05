use std::process::ExitCode;

use bevy::{prelude::*, window::WindowResolution};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
mod tests;

mod cli;
mod controller;
mod domain;
mod headless;
mod resource;
mod simulator;
mod visualizer;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    let config = args.config();

    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();

        let seed = args.seed.unwrap_or_else(rand::random);
        return match headless::run(&config, seed, args.ticks) {
            Ok(report) => {
                print!("{report}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("could not create world: {error}");
                ExitCode::FAILURE
            }
        };
    }

    let resolution = WindowResolution::new(config.track.width as f32, config.track.height as f32);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Racetrack".into(),
                resolution,
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(simulator::Simulator { config })
        .add_plugins(controller::Controller)
        .add_plugins(visualizer::Visualizer)
        .run();

    ExitCode::SUCCESS
}
