//! Basic building blocks.
//!
//! All coordinates are screen coordinates: x grows to the right, y grows downwards. A positive
//! rotation therefore turns clockwise on screen.

use std::{
    f64::consts::PI,
    ops::{Add, Mul, Neg, Sub},
};

use nalgebra::{Rotation2, Vector2};

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        ((self.x - position.x).powi(2) + (self.y - position.y).powi(2)).sqrt()
    }

    pub fn length(&self) -> f64 {
        self.distance(Position::default())
    }

    pub fn rotate_vector(&self, angle: Angle) -> Position {
        let rotated = Rotation2::new(angle.0) * Vector2::new(self.x, self.y);
        Position::new(rotated.x, rotated.y)
    }

    /// Heading in degrees that points from `self` towards `target` (0 = screen-up, clockwise).
    pub fn heading_to(&self, target: Position) -> Angle {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        Angle::new(f64::atan2(dx, -dy))
    }
}

impl From<Position> for (f32, f32) {
    fn from(value: Position) -> Self {
        (value.x as f32, value.y as f32)
    }
}

impl From<Position> for (f64, f64) {
    fn from(value: Position) -> Self {
        (value.x, value.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub fn new(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_deg(degree: f64) -> Self {
        Self(degree * PI / 180.0)
    }

    /// Degrees normalized into `[0, 360)`.
    pub fn to_deg(self) -> f64 {
        normalize_deg(self.0 * (180.0 / PI))
    }

    /// Degrees normalized into `(-180, 180]`.
    pub fn to_signed_deg(self) -> f64 {
        signed_deg(self.0 * (180.0 / PI))
    }

    /// Unit vector along this heading, using the screen convention (0 = up, clockwise).
    pub fn direction(self) -> Position {
        Position::new(self.0.sin(), -self.0.cos())
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Angle(-self.0)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

impl From<Angle> for f32 {
    fn from(value: Angle) -> Self {
        value.0 as f32
    }
}

pub fn normalize_deg(degree: f64) -> f64 {
    let normalized = degree.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

pub fn signed_deg(degree: f64) -> f64 {
    let normalized = normalize_deg(degree);
    if normalized > 180.0 {
        normalized - 360.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::{assert_abs_diff_eq, AbsDiffEq};
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_position() {
        let position = Position::new(1.0, 2.0);
        assert_abs_diff_eq!(position.x(), 1.0);
        assert_abs_diff_eq!(position.y(), 2.0);
    }

    #[rstest]
    #[case(Angle::new(0.0), 0.0)]
    #[case(Angle::new(0.5 * PI), 90.0)]
    #[case(Angle::new(1.0 * PI), 180.0)]
    #[case(Angle::new(1.5 * PI), 270.0)]
    #[case(Angle::new(2.0 * PI), 0.0)]
    #[case(Angle::new(-0.5 * PI), 270.0)]
    #[case(Angle::new(-4.5 * PI), 270.0)]
    fn test_angle_to_deg(#[case] angle: Angle, #[case] expected: f64) {
        assert_abs_diff_eq!(angle.to_deg(), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case(90.0, 90.0)]
    #[case(180.0, 180.0)]
    #[case(190.0, -170.0)]
    #[case(-180.0, 180.0)]
    #[case(-332.2, 27.8)]
    fn test_signed_deg(#[case] degree: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(signed_deg(degree), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_deg_tiny_negative() {
        assert_eq!(normalize_deg(-1e-17), 0.0);
    }

    #[rstest]
    #[case::up(0.0, (0.0, -1.0))]
    #[case::right(90.0, (1.0, 0.0))]
    #[case::down(180.0, (0.0, 1.0))]
    #[case::left(270.0, (-1.0, 0.0))]
    fn test_angle_direction(#[case] degree: f64, #[case] expected: (f64, f64)) {
        assert_abs_diff_eq!(
            Angle::from_deg(degree).direction(),
            Position::new(expected.0, expected.1),
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case(Position::new(0.0, -1.0), 0.0)]
    #[case(Position::new(1.0, 0.0), 90.0)]
    #[case(Position::new(0.0, 1.0), 180.0)]
    #[case(Position::new(-1.0, 0.0), 270.0)]
    fn test_heading_to(#[case] target: Position, #[case] expected: f64) {
        assert_abs_diff_eq!(
            Position::default().heading_to(target).to_deg(),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rotate_vector() {
        assert_abs_diff_eq!(
            Position::new(1.0, 0.0).rotate_vector(Angle::from_deg(90.0)),
            Position::new(0.0, 1.0),
            epsilon = 1e-12
        );
    }

    proptest! {
        #[test]
        fn normalized_degrees_stay_in_range(degree in -1.0e6f64..1.0e6) {
            let normalized = normalize_deg(degree);
            prop_assert!((0.0..360.0).contains(&normalized));
            let signed = signed_deg(degree);
            prop_assert!(signed > -180.0 && signed <= 180.0);
        }
    }

    impl AbsDiffEq for Position {
        type Epsilon = f64;

        fn default_epsilon() -> f64 {
            f64::EPSILON
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
            f64::abs_diff_eq(&self.x, &other.x, epsilon)
                && f64::abs_diff_eq(&self.y, &other.y, epsilon)
        }
    }

    impl AbsDiffEq for Angle {
        type Epsilon = f64;

        fn default_epsilon() -> f64 {
            f64::EPSILON
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
            f64::abs_diff_eq(&self.0, &other.0, epsilon)
        }
    }
}
