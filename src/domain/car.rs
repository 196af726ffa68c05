//! Car with a single-track steering approximation.
//!
//! Steering is expressed as a lateral offset of the center of rotation (CoR) rather than a direct
//! wheel angle. The front wheel tilts are derived from the CoR every tick and their mean drives
//! the heading change.

use std::slice::Iter;

use super::{
    basis::{normalize_deg, signed_deg},
    Angle, HasCollision, Position, SensorConfig, Sensors, Shape,
};

/// All distances are in pixels, speeds in pixels per tick. The car's local frame has x pointing
/// to its right side and y pointing to its rear.
#[derive(Clone, Debug, PartialEq)]
pub struct CarConfig {
    pub width: f64,
    pub height: f64,
    /// Distance of the axles from the front and rear body edges.
    pub axle_inset: f64,
    pub wheel_width: f64,
    pub wheel_height: f64,
    pub max_speed_forward: f64,
    pub max_speed_backward: f64,
    pub max_cor_y: f64,
    pub cor_distance_x: f64,
    pub steering_scale: f64,
    /// CoR offsets below this magnitude mean driving straight.
    pub min_cor_y: f64,
    /// Coasting snaps the velocity to zero below this magnitude.
    pub stop_epsilon: f64,
    pub coast_factor: f64,
    pub steering_relax_factor: f64,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 25.0,
            axle_inset: 6.0,
            wheel_width: 4.0,
            wheel_height: 8.0,
            max_speed_forward: 4.0,
            max_speed_backward: 2.0,
            max_cor_y: 10.0,
            cor_distance_x: 25.0,
            steering_scale: 1.0,
            min_cor_y: 1.0,
            stop_epsilon: 0.1,
            coast_factor: 0.99,
            steering_relax_factor: 0.9,
        }
    }
}

impl CarConfig {
    pub fn wheelbase(&self) -> f64 {
        self.height - 2.0 * self.axle_inset
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum WheelID {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelID {
    pub fn iter() -> Iter<'static, WheelID> {
        static WHEELS: [WheelID; 4] = [
            WheelID::FrontLeft,
            WheelID::FrontRight,
            WheelID::RearLeft,
            WheelID::RearRight,
        ];
        WHEELS.iter()
    }

    pub fn is_front(self) -> bool {
        matches!(self, WheelID::FrontLeft | WheelID::FrontRight)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Wheel {
    offset: Position,
    position: Position,
    tilt: f64,
}

impl Wheel {
    pub fn position(&self) -> Position {
        self.position
    }

    /// Steering tilt in degrees relative to the car heading, within `(-180, 180]`.
    pub fn tilt(&self) -> f64 {
        self.tilt
    }
}

/// Discrete driving command, already resolved from whatever input source produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SteerLeft(f64),
    SteerRight(f64),
    CenterSteering,
    Accelerate(f64),
    Brake(f64),
    Idle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    position: Position,
    heading: Angle,
    velocity: f64,
    cor_y: f64,
    active: bool,
    checkpoints_matched: usize,
    next_checkpoint: Option<Position>,
    wheels: [Wheel; 4],
    sensors: Sensors,
    config: CarConfig,
}

impl Car {
    pub fn new(
        position: Position,
        heading: Angle,
        config: CarConfig,
        sensor_config: &SensorConfig,
    ) -> Self {
        let mut car = Self {
            position,
            heading: Angle::from_deg(heading.to_deg()),
            velocity: 0.0,
            cor_y: 0.0,
            active: true,
            checkpoints_matched: 0,
            next_checkpoint: None,
            wheels: [Wheel::default(); 4],
            sensors: Sensors::new(sensor_config),
            config,
        };
        for wheel_id in WheelID::iter() {
            car.wheels[*wheel_id as usize].offset = car.local_wheel_position(*wheel_id);
        }
        car.refresh();
        car
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Lateral offset of the center of rotation; negative steers left.
    pub fn steering_offset(&self) -> f64 {
        self.cor_y
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn checkpoints_matched(&self) -> usize {
        self.checkpoints_matched
    }

    pub fn next_checkpoint(&self) -> Option<Position> {
        self.next_checkpoint
    }

    pub fn config(&self) -> &CarConfig {
        &self.config
    }

    pub fn wheel(&self, wheel_id: WheelID) -> &Wheel {
        &self.wheels[wheel_id as usize]
    }

    /// Drawing orientation of a wheel: car heading plus the wheel's tilt.
    pub fn wheel_heading(&self, wheel_id: WheelID) -> Angle {
        self.heading + Angle::from_deg(self.wheel(wheel_id).tilt)
    }

    pub fn sensors(&self) -> &Sensors {
        &self.sensors
    }

    pub(super) fn sensors_mut(&mut self) -> &mut Sensors {
        &mut self.sensors
    }

    /// Permanently takes the car out of the session.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub(super) fn set_next_checkpoint(&mut self, checkpoint: Position) {
        self.next_checkpoint = Some(checkpoint);
    }

    pub(super) fn match_checkpoint(&mut self, next: Position) {
        if self.active {
            self.checkpoints_matched += 1;
            self.next_checkpoint = Some(next);
        }
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::SteerLeft(force) => self.steer_left(force),
            Command::SteerRight(force) => self.steer_right(force),
            Command::CenterSteering => self.center_steering(),
            Command::Accelerate(force) => self.accelerate(force),
            Command::Brake(force) => self.accelerate(-force),
            Command::Idle => self.slow_down(),
        }
    }

    pub fn accelerate(&mut self, force: f64) {
        if !force.is_finite() {
            return;
        }
        self.velocity = (self.velocity + force).clamp(
            -self.config.max_speed_backward,
            self.config.max_speed_forward,
        );
    }

    pub fn slow_down(&mut self) {
        if self.velocity.abs() < self.config.stop_epsilon {
            self.velocity = 0.0;
        } else {
            self.velocity *= self.config.coast_factor;
        }
    }

    pub fn steer_left(&mut self, force: f64) {
        self.nudge_cor(-force);
    }

    pub fn steer_right(&mut self, force: f64) {
        self.nudge_cor(force);
    }

    pub fn center_steering(&mut self) {
        self.cor_y *= self.config.steering_relax_factor;
    }

    fn nudge_cor(&mut self, force: f64) {
        if !force.is_finite() {
            return;
        }
        self.cor_y = (self.cor_y + force * self.config.steering_scale)
            .clamp(-self.config.max_cor_y, self.config.max_cor_y);
    }

    pub fn rotate(&mut self, angle_degree: f64) {
        self.heading = Angle::from_deg(normalize_deg(self.heading.to_deg() + angle_degree));
    }

    /// Advances the car by one tick.
    pub fn update(&mut self) {
        self.position = self.position + self.heading.direction() * self.velocity;

        if let Some(steering_angle) = self.steering_angle() {
            let wheelbase = self.config.wheelbase();
            let delta = self.velocity / wheelbase * steering_angle.to_radians().tan();
            self.rotate(delta.to_degrees());
        }

        self.refresh();
    }

    /// Mean tilt of the front wheels in degrees, or `None` while driving straight.
    pub fn steering_angle(&self) -> Option<f64> {
        let cor = self.cor_position()?;
        let left = self.wheel_tilt(cor, self.wheel_world_position(WheelID::FrontLeft));
        let right = self.wheel_tilt(cor, self.wheel_world_position(WheelID::FrontRight));
        Some((left + right) / 2.0)
    }

    /// World position of the center of rotation, or `None` while driving straight.
    pub fn cor_position(&self) -> Option<Position> {
        if self.cor_y.abs() < self.config.min_cor_y {
            return None;
        }
        let local = Position::new(
            self.config.cor_distance_x.copysign(self.cor_y),
            self.cor_y.abs() - self.config.height / 2.0 + self.config.axle_inset,
        );
        Some(self.position + local.rotate_vector(self.heading))
    }

    pub fn body_corners(&self) -> [Position; 4] {
        let w2 = self.config.width / 2.0;
        let h2 = self.config.height / 2.0;
        [(-w2, -h2), (w2, -h2), (w2, h2), (-w2, h2)]
            .map(|(x, y)| self.position + Position::new(x, y).rotate_vector(self.heading))
    }

    pub fn distance_to_next_checkpoint(&self) -> Option<f64> {
        self.next_checkpoint.map(|c| self.position.distance(c))
    }

    fn local_wheel_position(&self, wheel_id: WheelID) -> Position {
        let w2 = self.config.width / 2.0;
        let axle = self.config.height / 2.0 - self.config.axle_inset;
        Position::new(
            match wheel_id {
                WheelID::FrontLeft | WheelID::RearLeft => -w2,
                WheelID::FrontRight | WheelID::RearRight => w2,
            },
            match wheel_id {
                WheelID::FrontLeft | WheelID::FrontRight => -axle,
                WheelID::RearLeft | WheelID::RearRight => axle,
            },
        )
    }

    fn wheel_world_position(&self, wheel_id: WheelID) -> Position {
        self.position
            + self.wheels[wheel_id as usize]
                .offset
                .rotate_vector(self.heading)
    }

    /// Tilt of a wheel in degrees relative to the heading. Right turns measure the angle from the
    /// CoR towards the wheel, left turns from the wheel towards the CoR, so both sides end up
    /// with the same sign convention.
    fn wheel_tilt(&self, cor: Position, wheel: Position) -> f64 {
        let angle = if self.cor_y > 0.0 {
            (wheel.y() - cor.y()).atan2(wheel.x() - cor.x()) - std::f64::consts::PI
        } else {
            (cor.y() - wheel.y()).atan2(cor.x() - wheel.x()) + std::f64::consts::PI
        };
        signed_deg(angle.to_degrees() - self.heading.to_deg())
    }

    /// Re-derives wheel poses and sensor attachment from the car pose.
    fn refresh(&mut self) {
        let cor = self.cor_position();
        for wheel_id in WheelID::iter() {
            let position = self.wheel_world_position(*wheel_id);
            let tilt = match cor {
                Some(cor) if wheel_id.is_front() => self.wheel_tilt(cor, position),
                _ => 0.0,
            };
            let wheel = &mut self.wheels[*wheel_id as usize];
            wheel.position = position;
            wheel.tilt = tilt;
        }
        self.sensors.attach(self.position, self.heading);
    }
}

impl HasCollision for Car {
    /// Axis-aligned bounds of the rotated body.
    fn shape(&self) -> Shape {
        let heading: f64 = self.heading.into();
        let (sin, cos) = (heading.sin().abs(), heading.cos().abs());
        Shape::Rectangle {
            position: self.position,
            x_length: self.config.width * cos + self.config.height * sin,
            y_length: self.config.width * sin + self.config.height * cos,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn car(heading: f64) -> Car {
        Car::new(
            Position::new(100.0, 100.0),
            Angle::from_deg(heading),
            CarConfig::default(),
            &SensorConfig::default(),
        )
    }

    fn max_steering_angle() -> f64 {
        ((10.0f64 / 19.0).atan().to_degrees() + (10.0f64 / 31.0).atan().to_degrees()) / 2.0
    }

    #[rstest]
    #[case::up(0.0, (100.0, 98.0))]
    #[case::right(90.0, (102.0, 100.0))]
    #[case::down(180.0, (100.0, 102.0))]
    #[case::left(270.0, (98.0, 100.0))]
    fn test_update_moves_along_heading(#[case] heading: f64, #[case] expected: (f64, f64)) {
        let mut car = car(heading);
        car.accelerate(2.0);
        car.update();
        assert_abs_diff_eq!(car.position(), Position::new(expected.0, expected.1), epsilon = EPSILON);
        assert_abs_diff_eq!(car.heading().to_deg(), heading, epsilon = EPSILON);
    }

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(10.0, 4.0)]
    #[case(-1.0, -1.0)]
    #[case(-10.0, -2.0)]
    #[case(f64::NAN, 0.0)]
    fn test_accelerate_clamps(#[case] force: f64, #[case] expected: f64) {
        let mut car = car(0.0);
        car.accelerate(force);
        assert_abs_diff_eq!(car.velocity(), expected);
    }

    #[test]
    fn test_slow_down_coasts_then_snaps() {
        let mut car = car(0.0);
        car.accelerate(1.0);
        car.slow_down();
        assert_abs_diff_eq!(car.velocity(), 0.99);
        for _ in 0..1000 {
            car.slow_down();
        }
        assert_eq!(car.velocity(), 0.0);
    }

    #[test]
    fn test_execute_commands() {
        let mut car = car(0.0);
        car.execute(Command::Accelerate(0.3));
        assert_abs_diff_eq!(car.velocity(), 0.3);
        car.execute(Command::Brake(0.1));
        assert_abs_diff_eq!(car.velocity(), 0.2, epsilon = EPSILON);
        car.execute(Command::Idle);
        assert_abs_diff_eq!(car.velocity(), 0.198, epsilon = EPSILON);
        car.execute(Command::SteerRight(0.5));
        assert_abs_diff_eq!(car.steering_offset(), 0.5);
        car.execute(Command::SteerLeft(1.0));
        assert_abs_diff_eq!(car.steering_offset(), -0.5);
        car.execute(Command::CenterSteering);
        assert_abs_diff_eq!(car.steering_offset(), -0.45, epsilon = EPSILON);
    }

    #[rstest]
    #[case::right(100.0, 10.0)]
    #[case::left(-100.0, -10.0)]
    fn test_steering_offset_clamped(#[case] force: f64, #[case] expected: f64) {
        let mut car = car(0.0);
        car.steer_right(force);
        assert_abs_diff_eq!(car.steering_offset(), expected);
        car.steer_left(-force);
        assert_abs_diff_eq!(car.steering_offset(), expected);
    }

    #[test]
    fn test_center_steering_never_snaps() {
        let mut car = car(0.0);
        car.steer_right(10.0);
        for _ in 0..50 {
            car.center_steering();
        }
        assert!(car.steering_offset() > 0.0);
        assert!(car.cor_position().is_none());
    }

    #[rstest]
    #[case::right_up(10.0, 0.0, 1.0)]
    #[case::right_sideways(10.0, 90.0, 1.0)]
    #[case::right_tilted(10.0, 217.0, 1.0)]
    #[case::left_up(-10.0, 0.0, -1.0)]
    #[case::left_tilted(-10.0, 305.0, -1.0)]
    fn test_steering_angle_is_pose_invariant(
        #[case] force: f64,
        #[case] heading: f64,
        #[case] sign: f64,
    ) {
        let mut car = car(heading);
        car.steer_right(force);
        assert_abs_diff_eq!(
            car.steering_angle().unwrap(),
            sign * max_steering_angle(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_steering_angle_straight() {
        let mut car = car(0.0);
        car.steer_right(0.5);
        assert_eq!(car.steering_angle(), None);
        assert_eq!(car.wheel(WheelID::FrontLeft).tilt(), 0.0);
    }

    #[rstest]
    #[case::right(10.0)]
    #[case::left(-10.0)]
    fn test_update_turns_towards_steering(#[case] force: f64) {
        let mut car = car(0.0);
        car.steer_right(force);
        car.accelerate(2.0);
        car.update();
        let expected = (2.0 / 13.0 * max_steering_angle().to_radians().tan()).to_degrees();
        assert_abs_diff_eq!(
            car.heading().to_signed_deg(),
            expected.copysign(force),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_update_driving_full_circle_returns_near_start() {
        let mut car = car(0.0);
        car.steer_right(10.0);
        car.accelerate(1.0);
        let mut turned = 0.0;
        let mut previous = car.heading().to_deg();
        while turned < 360.0 {
            car.update();
            let current = car.heading().to_deg();
            turned += signed_deg(current - previous);
            previous = current;
        }
        assert!(car.position().distance(Position::new(100.0, 100.0)) < 2.0);
    }

    #[test]
    fn test_wheel_positions_and_tilts() {
        let mut car = car(90.0);
        assert_abs_diff_eq!(
            car.wheel(WheelID::FrontLeft).position(),
            Position::new(106.5, 94.0),
            epsilon = EPSILON
        );
        assert_abs_diff_eq!(
            car.wheel(WheelID::RearRight).position(),
            Position::new(93.5, 106.0),
            epsilon = EPSILON
        );

        car.steer_right(10.0);
        car.update();
        assert!(car.wheel(WheelID::FrontLeft).tilt() > 0.0);
        assert!(car.wheel(WheelID::FrontRight).tilt() > car.wheel(WheelID::FrontLeft).tilt());
        assert_eq!(car.wheel(WheelID::RearLeft).tilt(), 0.0);
        assert_eq!(car.wheel(WheelID::RearRight).tilt(), 0.0);
        assert_abs_diff_eq!(
            car.wheel_heading(WheelID::FrontRight).to_deg(),
            90.0 + car.wheel(WheelID::FrontRight).tilt(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_update_attaches_sensors() {
        let mut car = car(90.0);
        car.accelerate(3.0);
        car.update();
        let angles = SensorConfig::default().ray_angles;
        assert_eq!(car.sensors().rays().len(), angles.len());
        for (ray, relative) in car.sensors().rays().iter().zip(angles) {
            assert_eq!(ray.origin(), car.position());
            let expected = 90.0 + relative;
            assert_abs_diff_eq!(
                signed_deg(ray.angle().to_deg() - expected),
                0.0,
                epsilon = EPSILON
            );
        }
    }

    #[test]
    fn test_body_corners() {
        let corners = car(90.0).body_corners();
        let expected = [(112.5, 94.0), (112.5, 106.0), (87.5, 106.0), (87.5, 94.0)];
        for (corner, (x, y)) in corners.iter().zip(expected) {
            assert_abs_diff_eq!(*corner, Position::new(x, y), epsilon = EPSILON);
        }
    }

    #[rstest]
    #[case(0.0, 12.0, 25.0)]
    #[case(90.0, 25.0, 12.0)]
    #[case(180.0, 12.0, 25.0)]
    fn test_shape_bounds_rotated_body(
        #[case] heading: f64,
        #[case] x_length: f64,
        #[case] y_length: f64,
    ) {
        let Shape::Rectangle {
            position,
            x_length: x,
            y_length: y,
        } = car(heading).shape()
        else {
            panic!("car shape must be a rectangle");
        };
        assert_eq!(position, Position::new(100.0, 100.0));
        assert_abs_diff_eq!(x, x_length, epsilon = EPSILON);
        assert_abs_diff_eq!(y, y_length, epsilon = EPSILON);
    }

    #[test]
    fn test_match_checkpoint_ignored_when_inactive() {
        let mut car = car(0.0);
        car.match_checkpoint(Position::new(1.0, 1.0));
        assert_eq!(car.checkpoints_matched(), 1);
        car.deactivate();
        car.match_checkpoint(Position::new(2.0, 2.0));
        assert_eq!(car.checkpoints_matched(), 1);
        assert_eq!(car.next_checkpoint(), Some(Position::new(1.0, 1.0)));
    }

    fn command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (-5.0f64..5.0).prop_map(Command::SteerLeft),
            (-5.0f64..5.0).prop_map(Command::SteerRight),
            Just(Command::CenterSteering),
            (-5.0f64..5.0).prop_map(Command::Accelerate),
            (-5.0f64..5.0).prop_map(Command::Brake),
            Just(Command::Idle),
        ]
    }

    proptest! {
        #[test]
        fn velocity_and_steering_stay_clamped(commands in prop::collection::vec(command(), 0..200)) {
            let mut car = car(0.0);
            for command in commands {
                car.execute(command);
                car.update();
                prop_assert!(car.velocity() >= -2.0 && car.velocity() <= 4.0);
                prop_assert!(car.steering_offset().abs() <= 10.0);
                let heading = car.heading().to_deg();
                prop_assert!((0.0..360.0).contains(&heading));
            }
        }

        #[test]
        fn rotate_keeps_heading_normalized(angles in prop::collection::vec(-1000.0f64..1000.0, 0..100)) {
            let mut car = car(0.0);
            for angle in angles {
                car.rotate(angle);
                let heading = car.heading().to_deg();
                prop_assert!((0.0..360.0).contains(&heading));
            }
        }
    }
}
