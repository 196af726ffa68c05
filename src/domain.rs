//! The domain module encapsulates the core simulation. It defines the `Track` and `Car`
//! entities, along with the `Collider` deciding how cars interact with the rendered track.
//!
//! The module does not depend on Bevy. Rendering and input are provided by the surrounding
//! plugins through the `ColorLookup` and `Command` seams.

mod basis;
mod car;
mod collider;
mod collision;
mod displacement;
mod driver;
mod graph;
mod hull;
mod mask;
mod sensor;
mod track;
mod world;

pub use basis::{Angle, Position};
pub use car::{Car, CarConfig, Command, WheelID};
pub use collider::{Checkpoint, Collider};
pub use collision::{HasCollision, Shape};
pub use displacement::{Displacement, DisplacementError};
pub use driver::{Autopilot, Driver, Fitness};
pub use graph::{TrackEdge, TrackNode};
pub use hull::{ConvexHull, GrahamScan};
pub use mask::{ColorLookup, MaskStyle, Rgba, TrackMask};
pub use sensor::{Ray, SensorConfig, SensorError, Sensors};
pub use track::{Track, TrackConfig, TrackError};
pub use world::{SimulationConfig, World, WorldError};
