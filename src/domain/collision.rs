//! Collision detection based on basic shapes.

use super::Position;

pub trait HasCollision {
    fn has_collision(&self, other: &dyn HasCollision) -> bool {
        self.shape().has_intersection(&other.shape())
    }

    fn shape(&self) -> Shape;
}

/// Rectangles are axis-aligned and centered on `position`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rectangle {
        position: Position,
        x_length: f64,
        y_length: f64,
    },
    Circle {
        position: Position,
        radius: f64,
    },
}

impl Shape {
    fn has_intersection(&self, other: &Shape) -> bool {
        match (self, other) {
            (
                Shape::Circle { position, radius },
                Shape::Circle {
                    position: other_position,
                    radius: other_radius,
                },
            ) => position.distance(*other_position) < radius + other_radius,
            (
                Shape::Circle { position, radius },
                Shape::Rectangle {
                    position: other_position,
                    x_length: other_x_length,
                    y_length: other_y_length,
                },
            )
            | (
                Shape::Rectangle {
                    position: other_position,
                    x_length: other_x_length,
                    y_length: other_y_length,
                },
                Shape::Circle { position, radius },
            ) => {
                let closest = Position::new(
                    position.x().clamp(
                        other_position.x() - other_x_length / 2.0,
                        other_position.x() + other_x_length / 2.0,
                    ),
                    position.y().clamp(
                        other_position.y() - other_y_length / 2.0,
                        other_position.y() + other_y_length / 2.0,
                    ),
                );
                position.distance(closest) < *radius
            }
            (
                Shape::Rectangle {
                    position,
                    x_length,
                    y_length,
                },
                Shape::Rectangle {
                    position: other_position,
                    x_length: other_x_length,
                    y_length: other_y_length,
                },
            ) => {
                (position.x() - other_position.x()).abs() < (x_length + other_x_length) / 2.0
                    && (position.y() - other_position.y()).abs()
                        < (y_length + other_y_length) / 2.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    struct Fixed(Shape);

    impl HasCollision for Fixed {
        fn shape(&self) -> Shape {
            self.0
        }
    }

    fn rect(x: f64, y: f64, x_length: f64, y_length: f64) -> Shape {
        Shape::Rectangle {
            position: Position::new(x, y),
            x_length,
            y_length,
        }
    }

    fn circle(x: f64, y: f64, radius: f64) -> Shape {
        Shape::Circle {
            position: Position::new(x, y),
            radius,
        }
    }

    #[rstest]
    #[case::overlapping_circles(circle(0.0, 0.0, 1.0), circle(1.5, 0.0, 1.0), true)]
    #[case::touching_circles(circle(0.0, 0.0, 1.0), circle(2.0, 0.0, 1.0), false)]
    #[case::circle_on_rect_side(circle(0.0, 0.0, 1.0), rect(1.5, 0.0, 2.0, 10.0), true)]
    #[case::circle_touching_rect(circle(0.0, 0.0, 1.0), rect(2.0, 0.0, 2.0, 10.0), false)]
    #[case::circle_near_corner(circle(0.0, 0.0, 1.0), rect(1.5, 1.5, 2.0, 2.0), true)]
    #[case::circle_off_corner(circle(0.0, 0.0, 1.0), rect(1.8, 1.8, 2.0, 2.0), false)]
    #[case::circle_inside_rect(circle(0.0, 0.0, 1.0), rect(0.0, 0.0, 10.0, 10.0), true)]
    #[case::rect_around_circle(rect(0.0, 0.0, 1.0, 1.0), circle(0.0, 0.0, 10.0), true)]
    #[case::crossing_rects(rect(0.0, 0.0, 10.0, 1.0), rect(0.0, 0.0, 1.0, 10.0), true)]
    #[case::separate_rects(rect(0.0, 0.0, 1.0, 1.0), rect(3.0, 0.0, 1.0, 1.0), false)]
    fn test_has_collision(#[case] lhs: Shape, #[case] rhs: Shape, #[case] expected: bool) {
        assert_eq!(Fixed(lhs).has_collision(&Fixed(rhs)), expected);
        assert_eq!(Fixed(rhs).has_collision(&Fixed(lhs)), expected);
    }
}
