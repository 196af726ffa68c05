//! Off-track detection, ray sensing and checkpoint progress against the rendered track mask.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::{
    Angle, Car, ColorLookup, HasCollision, Position, Ray, Rgba, SensorConfig, Shape, Track,
};

/// Number of memoized probe offsets kept before the table is cleared.
const DELTA_CAPACITY: usize = 1 << 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    position: Position,
    radius: f64,
}

impl Checkpoint {
    pub fn new(position: Position, radius: f64) -> Self {
        Self { position, radius }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl HasCollision for Checkpoint {
    fn shape(&self) -> Shape {
        Shape::Circle {
            position: self.position,
            radius: self.radius,
        }
    }
}

pub struct Collider {
    lookup: Box<dyn ColorLookup>,
    track_color: Rgba,
    sensor: SensorConfig,
    checkpoint_radius: f64,
    deltas: HashMap<(u64, u64), Position>,
}

impl Collider {
    pub fn new(
        lookup: Box<dyn ColorLookup>,
        track_color: Rgba,
        sensor: SensorConfig,
        checkpoint_radius: f64,
    ) -> Self {
        Self {
            lookup,
            track_color,
            sensor,
            checkpoint_radius,
            deltas: HashMap::new(),
        }
    }

    pub fn lookup(&self) -> &dyn ColorLookup {
        self.lookup.as_ref()
    }

    pub fn checkpoint_radius(&self) -> f64 {
        self.checkpoint_radius
    }

    /// Checkpoint the car is currently heading for.
    pub fn checkpoint_for(&self, track: &Track, car: &Car) -> Checkpoint {
        let position = car
            .next_checkpoint()
            .unwrap_or_else(|| track.checkpoint(car.checkpoints_matched()).position());
        Checkpoint::new(position, self.checkpoint_radius)
    }

    /// Runs one collision pass over all active cars. Expects the kinematics of every car to be
    /// advanced already.
    pub fn update(&mut self, track: &Track, cars: &mut [Car]) {
        for (idx, car) in cars.iter_mut().enumerate() {
            if car.is_active() {
                self.update_car(idx, track, car);
            }
        }
    }

    fn update_car(&mut self, idx: usize, track: &Track, car: &mut Car) {
        if !self.is_on_track(car.position()) {
            car.deactivate();
            debug!(
                car = idx,
                x = car.position().x(),
                y = car.position().y(),
                checkpoints = car.checkpoints_matched(),
                "car left the track"
            );
            return;
        }

        for ray in car.sensors_mut().rays_mut() {
            self.cast(ray);
        }

        if car.next_checkpoint().is_none() {
            car.set_next_checkpoint(track.checkpoint(car.checkpoints_matched()).position());
        }
        let checkpoint = self.checkpoint_for(track, car);
        if checkpoint.has_collision(&*car) {
            let next = track.checkpoint(car.checkpoints_matched() + 1).position();
            car.match_checkpoint(next);
            debug!(
                car = idx,
                checkpoints = car.checkpoints_matched(),
                "checkpoint reached"
            );
        }
    }

    pub fn is_on_track(&self, position: Position) -> bool {
        self.lookup
            .sample(position)
            .is_some_and(|color| color.same_color(&self.track_color))
    }

    /// Grows the probe until it leaves the origin's color, leaves the image or would exceed the
    /// maximum length. The hit is the last probed point.
    pub fn cast(&mut self, ray: &mut Ray) {
        let origin = ray.origin();
        let angle = ray.angle();
        let origin_color = self.lookup.sample(origin);

        let mut length = self.sensor.probe_start;
        let mut point = origin + self.delta(angle, length);
        let mut iterations = 1;
        loop {
            let open = match (origin_color, self.lookup.sample(point)) {
                (Some(origin_color), Some(color)) => color.same_color(&origin_color),
                _ => false,
            };
            if !open || length + self.sensor.probe_step > self.sensor.max_ray_length {
                break;
            }
            length += self.sensor.probe_step;
            point = origin + self.delta(angle, length);
            iterations += 1;
        }

        trace!(iterations, length, "ray cast");
        ray.set_hit(point, length);
    }

    fn delta(&mut self, angle: Angle, length: f64) -> Position {
        if self.deltas.len() >= DELTA_CAPACITY {
            self.deltas.clear();
        }
        let radians: f64 = angle.into();
        *self
            .deltas
            .entry((radians.to_bits(), length.to_bits()))
            .or_insert_with(|| angle.direction() * length)
    }
}
