//! Sources of driving commands and the scoring helpers used to compare drivers.

use super::{Car, Command, Track};

/// Produces the commands a car executes before the next tick.
pub trait Driver: Send + Sync {
    fn commands(&mut self, car: &Car, track: &Track) -> Vec<Command>;
}

/// Scripted driver that steers towards the next checkpoint at a fixed cruise speed.
#[derive(Clone, Debug, PartialEq)]
pub struct Autopilot {
    pub cruise_speed: f64,
    pub throttle: f64,
    pub steering_force: f64,
    /// Heading errors within this many degrees count as on course.
    pub tolerance: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            cruise_speed: 2.0,
            throttle: 0.3,
            steering_force: 1.0,
            tolerance: 5.0,
        }
    }
}

impl Driver for Autopilot {
    fn commands(&mut self, car: &Car, track: &Track) -> Vec<Command> {
        let target = car
            .next_checkpoint()
            .unwrap_or_else(|| track.checkpoint(car.checkpoints_matched()).position());
        let error = (car.position().heading_to(target) + -car.heading()).to_signed_deg();

        let steering = if error > self.tolerance {
            Command::SteerRight(self.steering_force)
        } else if error < -self.tolerance {
            Command::SteerLeft(self.steering_force)
        } else {
            Command::CenterSteering
        };

        let throttle = if car.velocity() < self.cruise_speed {
            Command::Accelerate(self.throttle.min(self.cruise_speed - car.velocity()))
        } else {
            Command::Idle
        };

        vec![steering, throttle]
    }
}

/// Progress score: reward per checkpoint minus the scaled distance left to the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fitness {
    pub checkpoint_reward: f64,
    pub distance_scale: f64,
}

impl Default for Fitness {
    fn default() -> Self {
        Self {
            checkpoint_reward: 10.0,
            distance_scale: 100.0,
        }
    }
}

impl Fitness {
    pub fn score(&self, car: &Car) -> f64 {
        let reward = car.checkpoints_matched() as f64 * self.checkpoint_reward;
        let remaining = car.distance_to_next_checkpoint().unwrap_or_default();
        reward - remaining / self.distance_scale
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{
        domain::{Angle, CarConfig, Collider, Position, SensorConfig},
        tests::{open_mask, straight_track, TRACK},
    };

    fn car(heading: f64) -> Car {
        Car::new(
            Position::new(100.0, 50.0),
            Angle::from_deg(heading),
            CarConfig::default(),
            &SensorConfig::default(),
        )
    }

    #[rstest]
    #[case::on_course(90.0, Command::CenterSteering)]
    #[case::veering_left(45.0, Command::SteerRight(1.0))]
    #[case::veering_right(135.0, Command::SteerLeft(1.0))]
    #[case::facing_away(200.0, Command::SteerLeft(1.0))]
    fn test_autopilot_steers_towards_checkpoint(#[case] heading: f64, #[case] expected: Command) {
        let track = straight_track(400, 1);
        let commands = Autopilot::default().commands(&car(heading), &track);
        assert_eq!(commands, vec![expected, Command::Accelerate(0.3)]);
    }

    #[test]
    fn test_autopilot_holds_cruise_speed() {
        let track = straight_track(400, 1);
        let mut car = car(90.0);
        car.accelerate(1.9);
        let mut autopilot = Autopilot::default();
        let commands = autopilot.commands(&car, &track);
        assert_abs_diff_eq!(
            match commands[1] {
                Command::Accelerate(force) => force,
                _ => f64::NAN,
            },
            0.1,
            epsilon = 1e-9
        );
        car.accelerate(1.0);
        assert_eq!(autopilot.commands(&car, &track)[1], Command::Idle);
    }

    #[test]
    fn test_fitness_score() {
        let track = straight_track(400, 1);
        let mut collider = Collider::new(
            Box::new(open_mask(400, 100)),
            TRACK,
            SensorConfig::default(),
            30.0,
        );
        let mut cars = vec![car(90.0)];
        collider.update(&track, &mut cars);
        assert_abs_diff_eq!(Fitness::default().score(&cars[0]), -1.0, epsilon = 1e-9);

        let mut cars = vec![Car::new(
            Position::new(190.0, 50.0),
            Angle::from_deg(90.0),
            CarConfig::default(),
            &SensorConfig::default(),
        )];
        collider.update(&track, &mut cars);
        assert_eq!(cars[0].checkpoints_matched(), 1);
        assert_abs_diff_eq!(Fitness::default().score(&cars[0]), 10.0 - 2.0, epsilon = 1e-9);
    }
}
